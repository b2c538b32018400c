use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::error::ImageError;
use crate::models::config::OcrConfig;

/// Decode JPEG/PNG bytes into an RGB pixel grid
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Decode a base64 payload, with or without a `data:image/...;base64,` prefix
pub fn decode_base64_image(payload: &str) -> Result<Vec<u8>, ImageError> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };

    let data = data.trim();
    if data.is_empty() {
        return Err(ImageError::Empty);
    }

    Ok(general_purpose::STANDARD.decode(data)?)
}

/// Accepted range for the configured scale factor
pub const MIN_UPSCALE_FACTOR: f64 = 0.25;
pub const MAX_UPSCALE_FACTOR: f64 = 4.0;

/// Image preprocessing service for OCR
pub struct PreprocessingService {
    upscale_factor: f64,
}

impl PreprocessingService {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            upscale_factor: sanitize_upscale_factor(config.upscale_factor),
        }
    }

    pub fn upscale_factor(&self) -> f64 {
        self.upscale_factor
    }

    /// Full preprocessing pipeline: grayscale → optional upscale
    pub fn prepare(&self, image: &RgbImage) -> GrayImage {
        let gray = self.to_grayscale(image);

        if (self.upscale_factor - 1.0).abs() < f64::EPSILON {
            return gray;
        }

        self.scale(&gray, self.upscale_factor)
    }

    /// Convert image to grayscale
    pub fn to_grayscale(&self, image: &RgbImage) -> GrayImage {
        image::imageops::grayscale(image)
    }

    /// Scale image by factor
    pub fn scale(&self, image: &GrayImage, factor: f64) -> GrayImage {
        let new_width = ((image.width() as f64 * factor) as u32).max(1);
        let new_height = ((image.height() as f64 * factor) as u32).max(1);

        DynamicImage::ImageLuma8(image.clone())
            .resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
            .to_luma8()
    }
}

/// Non-finite or non-positive factors disable scaling; others are clamped
fn sanitize_upscale_factor(factor: f64) -> f64 {
    if !factor.is_finite() || factor <= 0.0 {
        tracing::warn!(factor, "Invalid upscale factor, scaling disabled");
        return 1.0;
    }

    let clamped = factor.clamp(MIN_UPSCALE_FACTOR, MAX_UPSCALE_FACTOR);
    if clamped != factor {
        tracing::warn!(factor, clamped, "Upscale factor out of range");
    }
    clamped
}

impl Default for PreprocessingService {
    fn default() -> Self {
        Self::new(&OcrConfig::default())
    }
}
