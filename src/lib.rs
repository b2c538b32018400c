//! Thermocheck: read a temperature from a thermometer photo and compare it
//! with the current reading from a weather service.
//!
//! The pipeline lives in [`services`]; the Tauri desktop shell (feature
//! `desktop`) and the `thermocheck` CLI are thin front ends over it.

pub mod error;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(feature = "desktop")]
mod commands;

pub use error::{AppError, ConfigError, ImageError, OcrError, WeatherError};
pub use models::comparison::{ComparisonReport, ComparisonResult, IncompleteReason};
pub use models::config::AppConfig;
pub use models::image_source::{ImageId, ImageSource};
pub use models::ocr_result::ImageAnalysis;
pub use services::{ConfigManager, Session, ThermoCheck};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::compare::{compare_temperature, default_city};
    use commands::config::{get_config_path, init_config_manager, load_config, save_config};
    use commands::image::{
        clear_image, get_session, init_pipeline_state, ocr_status, select_source, submit_image,
    };

    logging::init_logging(logging::LogFormat::Text);

    // Initialize config manager
    let config_manager = init_config_manager().expect("Failed to initialize config manager");
    let config = {
        let manager = config_manager.lock().expect("Config manager lock poisoned");
        manager.load_effective().unwrap_or_else(|e| {
            tracing::warn!("Using default config: {}", e);
            AppConfig::default()
        })
    };

    let pipeline_state = init_pipeline_state(&config);

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(pipeline_state)
        .manage(config_manager)
        .invoke_handler(tauri::generate_handler![
            ocr_status,
            submit_image,
            select_source,
            clear_image,
            get_session,
            default_city,
            compare_temperature,
            load_config,
            save_config,
            get_config_path
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
