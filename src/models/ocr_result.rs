use serde::{Deserialize, Serialize};

use crate::models::image_source::ImageId;

/// Warning shown when the OCR text holds no temperature
pub const NO_TEMPERATURE_WARNING: &str = "No temperature value detected.";

/// Result of running one image through decode, OCR and extraction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAnalysis {
    pub image: ImageId,
    pub width: u32,
    pub height: u32,
    pub raw_text: String,
    pub temperature: Option<i32>,
    pub warning: Option<String>,
    /// True when this image replaced a different active image (derived state was reset)
    pub replaced_previous: bool,
}

impl ImageAnalysis {
    pub fn new(
        image: ImageId,
        (width, height): (u32, u32),
        raw_text: String,
        temperature: Option<i32>,
        replaced_previous: bool,
    ) -> Self {
        let warning = temperature
            .is_none()
            .then(|| NO_TEMPERATURE_WARNING.to_string());

        Self {
            image,
            width,
            height,
            raw_text,
            temperature,
            warning,
            replaced_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image_source::ImageSource;

    #[test]
    fn test_warning_only_when_temperature_missing() {
        let id = ImageId::from_bytes(ImageSource::Upload, b"img");

        let found = ImageAnalysis::new(id.clone(), (10, 10), "25°C".into(), Some(25), true);
        assert!(found.warning.is_none());

        let missing = ImageAnalysis::new(id, (10, 10), "hello".into(), None, true);
        assert_eq!(missing.warning.as_deref(), Some(NO_TEMPERATURE_WARNING));
    }
}
