use image::GrayImage;

use crate::error::OcrError;

/// OCR Engine trait - abstraction over text recognizers
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a single-channel image.
    ///
    /// An image without readable text yields an empty (or whitespace) string,
    /// not an error.
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
