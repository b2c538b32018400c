pub mod engine;
pub mod parser;
pub mod preprocessing;
pub mod tesseract;

// Re-export main types
pub use engine::OcrEngine;
pub use parser::{extract_temperature, find_temperature, TemperatureMatch};
pub use preprocessing::{decode_base64_image, decode_image, PreprocessingService};
pub use tesseract::TesseractEngine;
