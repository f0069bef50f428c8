pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use models::classify_types::ClassificationResult;
pub use models::shelf_life_types::StorageCondition;
pub use services::classifier::preprocess::ImageSource;
pub use services::orchestrator::core::{Event, OrchestrationState, Phase};
pub use services::orchestrator::session::ClassifierSession;

use services::classifier::model_manager::ModelManager;
use services::location::{FixedLocation, LocationProvider, NoLocation};
use services::shelf_life_client::ShelfLifeClient;
use services::weather_client::WeatherClient;
use std::sync::Arc;

/// Installs the `env_logger` backend, defaulting to `info`. Safe to call
/// more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

/// Wires a session against the real model runtime and HTTP services.
pub fn build_session(config: &AppConfig) -> ClassifierSession {
    let location: Arc<dyn LocationProvider> = match config.location {
        Some(at) => Arc::new(FixedLocation(at)),
        None => Arc::new(NoLocation::default()),
    };

    if config.weather.api_key.is_empty() {
        log::warn!(
            "No weather API key configured; set {} or [weather].api_key",
            config::WEATHER_API_KEY_ENV
        );
    }

    let http = reqwest::Client::new();
    ClassifierSession::new(
        ModelManager::new(config.model.clone()),
        location,
        Arc::new(WeatherClient::with_client(http.clone(), config.weather.clone())),
        Arc::new(ShelfLifeClient::with_client(http, config.shelf_life.clone())),
        config.default_storage,
    )
}
