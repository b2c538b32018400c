use crate::models::config::AppConfig;
use crate::models::image_source::ImageSource;
use crate::models::ocr_result::ImageAnalysis;
use crate::services::ocr::decode_base64_image;
use crate::services::{Session, ThermoCheck};
use parking_lot::Mutex;
use std::sync::Arc;
use tauri::State;

/// Pipeline plus the window's session (Arc for sharing with blocking OCR tasks)
pub struct PipelineState {
    pipeline: Result<Arc<ThermoCheck>, String>,
    pub session: Arc<Mutex<Session>>,
}

impl PipelineState {
    /// The pipeline, or the startup error that makes the app unusable
    pub fn pipeline(&self) -> Result<Arc<ThermoCheck>, String> {
        self.pipeline.as_ref().map(Arc::clone).map_err(Clone::clone)
    }
}

/// Initialize pipeline state. A missing OCR engine is kept as an error that
/// every pipeline command reports.
pub fn init_pipeline_state(config: &AppConfig) -> PipelineState {
    let pipeline = match ThermoCheck::from_config(config) {
        Ok(pipeline) => Ok(Arc::new(pipeline)),
        Err(e) => {
            tracing::error!("Pipeline unavailable: {}", e);
            Err(e.to_string())
        }
    };

    PipelineState {
        pipeline,
        session: Arc::new(Mutex::new(Session::new())),
    }
}

// ============================================================
// Tauri Commands
// ============================================================

/// Ok when OCR is usable, otherwise the message naming the missing dependency
#[tauri::command]
pub fn ocr_status(state: State<PipelineState>) -> Result<(), String> {
    state.pipeline().map(|_| ())
}

/// Analyze an uploaded or captured image (base64, optionally a data URL)
#[tauri::command]
pub async fn submit_image(
    state: State<'_, PipelineState>,
    source: ImageSource,
    image_base64: String,
) -> Result<ImageAnalysis, String> {
    let pipeline = state.pipeline()?;
    let session = Arc::clone(&state.session);

    // Decoding and tesseract are blocking work. The session is only locked
    // around activation and recording, so source switches stay responsive.
    tokio::task::spawn_blocking(move || {
        let bytes = decode_base64_image(&image_base64).map_err(|e| e.to_string())?;
        pipeline
            .analyze_shared(&session, source, &bytes)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| format!("Image analysis task failed: {}", e))?
}

/// Switch between upload and camera input
#[tauri::command]
pub fn select_source(state: State<PipelineState>, source: ImageSource) -> Result<Session, String> {
    state.pipeline()?;
    let mut session = state.session.lock();
    session.select_source(source);
    Ok(session.clone())
}

/// Drop the active image and everything derived from it
#[tauri::command]
pub fn clear_image(state: State<PipelineState>) -> Result<Session, String> {
    let mut session = state.session.lock();
    session.clear();
    Ok(session.clone())
}

/// Current session (active image, extracted text and temperature)
#[tauri::command]
pub fn get_session(state: State<PipelineState>) -> Result<Session, String> {
    Ok(state.session.lock().clone())
}
