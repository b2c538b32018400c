use super::image::PipelineState;
use crate::models::comparison::ComparisonReport;
use tauri::State;

/// Default city for the city field
#[tauri::command]
pub fn default_city(state: State<PipelineState>) -> Result<String, String> {
    Ok(state.pipeline()?.default_city().to_string())
}

/// Compare the extracted temperature with the live reading for `city`
#[tauri::command]
pub async fn compare_temperature(
    state: State<'_, PipelineState>,
    city: Option<String>,
) -> Result<ComparisonReport, String> {
    let pipeline = state.pipeline()?;
    // Copy out so the session lock is not held across the request
    let extracted = state.session.lock().temperature();

    Ok(pipeline.compare_temperature(extracted, city.as_deref()).await)
}
