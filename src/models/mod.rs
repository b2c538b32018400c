pub mod comparison;
pub mod config;
pub mod image_source;
pub mod ocr_result;
