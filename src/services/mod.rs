pub mod comparator;
pub mod config;
pub mod ocr;
pub mod pipeline;
pub mod session;
pub mod weather;

pub use comparator::{build_report, compare};
pub use config::ConfigManager;
pub use pipeline::ThermoCheck;
pub use session::Session;
pub use weather::{WeatherClient, WeatherReading};
