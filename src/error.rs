use std::path::PathBuf;

use thiserror::Error;

/// Image acquisition and decoding errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image is empty")]
    Empty,
    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to read image file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// OCR engine errors
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Tesseract OCR not found! Please install it (searched: {searched})")]
    Unavailable { searched: String },
    #[error("Failed to encode image for OCR: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to run tesseract: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tesseract failed: {0}")]
    Recognition(String),
}

/// Weather lookup errors
///
/// Transport errors are stored with their request URL stripped, since the URL
/// carries the API key as a query parameter.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather API key is not configured (set OPENWEATHER_API_KEY)")]
    MissingApiKey,
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("City not found: {city}")]
    CityNotFound { city: String },
    #[error("Weather service rejected the API key")]
    Unauthorized,
    #[error("Weather service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Weather response for {city} has no temperature")]
    MissingTemperature { city: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn network(error: reqwest::Error) -> Self {
        Self::Network(error.without_url())
    }
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    NoConfigDir,
    #[error("Config I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error for pipeline operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
