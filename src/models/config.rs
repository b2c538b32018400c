use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// City used when the user does not type one
pub const DEFAULT_CITY: &str = "Dhaka";

/// Weather service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_city: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            timeout_secs: 10,
            default_city: DEFAULT_CITY.to_string(),
        }
    }
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    /// Explicit tesseract executable; searched on PATH when unset
    pub tesseract_path: Option<PathBuf>,
    pub language: String,
    /// Tesseract page segmentation mode (3 = fully automatic)
    pub page_seg_mode: u8,
    /// Scale applied after grayscale conversion, 1.0 keeps the original size
    pub upscale_factor: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_path: None,
            language: "eng".to_string(),
            page_seg_mode: 3,
            upscale_factor: 1.0,
        }
    }
}

/// Application configuration, persisted as JSON.
///
/// The weather API key is not stored here; it is read from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

impl AppConfig {
    /// Apply values that may come from the environment instead of the config file
    pub fn apply_overrides(&mut self, weather_url: Option<String>) {
        if let Some(url) = weather_url.filter(|u| !u.trim().is_empty()) {
            self.weather.base_url = url.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.weather.default_city, "Dhaka");
        assert_eq!(config.weather.timeout_secs, 10);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.page_seg_mode, 3);
        assert!(config.ocr.tesseract_path.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "weather": { "default_city": "Chittagong" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.weather.default_city, "Chittagong");
        assert_eq!(config.weather.timeout_secs, 10);
        assert_eq!(config.ocr, OcrConfig::default());
    }

    #[test]
    fn test_config_never_serializes_api_key() {
        let json = serde_json::to_string(&AppConfig::default()).unwrap();
        assert!(!json.contains("api_key"));
        assert!(!json.contains("appid"));
    }

    #[test]
    fn test_weather_url_override() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("http://127.0.0.1:8080".into()));
        assert_eq!(config.weather.base_url, "http://127.0.0.1:8080");

        config.apply_overrides(Some("   ".into()));
        assert_eq!(config.weather.base_url, "http://127.0.0.1:8080");

        config.apply_overrides(None);
        assert_eq!(config.weather.base_url, "http://127.0.0.1:8080");
    }
}
