use serde::Serialize;

use crate::models::image_source::{ImageId, ImageSource};

/// Per-user session state: the active image and what was derived from it.
///
/// Invariant: `raw_text` and `temperature` always belong to `active_image`.
/// Any change of image or source clears them before new values are recorded.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Session {
    active_source: Option<ImageSource>,
    active_image: Option<ImageId>,
    raw_text: Option<String>,
    temperature: Option<i32>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_source(&self) -> Option<ImageSource> {
        self.active_source
    }

    pub fn active_image(&self) -> Option<&ImageId> {
        self.active_image.as_ref()
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    pub fn temperature(&self) -> Option<i32> {
        self.temperature
    }

    /// True once OCR output for the active image has been recorded
    pub fn is_analyzed(&self) -> bool {
        self.active_image.is_some() && self.raw_text.is_some()
    }

    /// Switch the input source (upload ↔ camera).
    ///
    /// Drops an active image from the other source together with its derived
    /// state. Returns true if anything was cleared.
    pub fn select_source(&mut self, source: ImageSource) -> bool {
        self.active_source = Some(source);

        let stale = self
            .active_image
            .as_ref()
            .is_some_and(|image| image.source != source);

        if stale {
            tracing::debug!(%source, "Source switched, clearing previous image");
            self.active_image = None;
            self.invalidate();
        }
        stale
    }

    /// Make `id` the active image.
    ///
    /// Returns false if it already was (derived state kept), true if it
    /// replaced something else (derived state cleared).
    pub fn activate(&mut self, id: ImageId) -> bool {
        if self.active_image.as_ref() == Some(&id) {
            return false;
        }

        self.invalidate();
        self.active_source = Some(id.source);
        self.active_image = Some(id);
        true
    }

    /// Store OCR output for `id`. Ignored (returns false) if `id` is no longer active.
    pub fn record_analysis(&mut self, id: &ImageId, raw_text: String, temperature: Option<i32>) -> bool {
        if self.active_image.as_ref() != Some(id) {
            tracing::debug!(fingerprint = %id.fingerprint, "Dropping analysis for inactive image");
            return false;
        }

        self.raw_text = Some(raw_text);
        self.temperature = temperature;
        true
    }

    /// Forget the active image and everything derived from it; keeps the selected source
    pub fn clear(&mut self) {
        self.active_image = None;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.raw_text = None;
        self.temperature = None;
    }
}
