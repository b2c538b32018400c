use crate::models::config::AppConfig;
use crate::services::config::ConfigManager;
use std::sync::Mutex;
use tauri::State;

/// State wrapper for configuration manager
pub type ConfigManagerState = Mutex<ConfigManager>;

/// Initialize config manager state
pub fn init_config_manager() -> Result<ConfigManagerState, String> {
    let manager = ConfigManager::new().map_err(|e| e.to_string())?;
    Ok(Mutex::new(manager))
}

/// Save complete configuration (OCR and weather changes apply on next start)
#[tauri::command]
pub fn save_config(state: State<ConfigManagerState>, config: AppConfig) -> Result<(), String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    manager.save(&config).map_err(|e| e.to_string())
}

/// Load complete configuration
#[tauri::command]
pub fn load_config(state: State<ConfigManagerState>) -> Result<AppConfig, String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    manager.load().map_err(|e| e.to_string())
}

/// Get config file path
#[tauri::command]
pub fn get_config_path(state: State<ConfigManagerState>) -> Result<String, String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    Ok(manager.config_file_path().to_string_lossy().to_string())
}
