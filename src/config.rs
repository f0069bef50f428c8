use crate::error::AppError;
use crate::models::shelf_life_types::StorageCondition;
use crate::models::weather_types::Coordinates;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const WEATHER_API_KEY_ENV: &str = "FRESHLENS_WEATHER_API_KEY";
pub const PREDICT_URL_ENV: &str = "FRESHLENS_PREDICT_URL";

const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/";
const DEFAULT_PREDICT_URL: &str = "http://127.0.0.1:8000/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    /// Used when the model leaves H/W dynamic.
    pub fallback_input_size: u32,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/dish_classifier.onnx"),
            labels_path: PathBuf::from("assets/dish_labels.txt"),
            fallback_input_size: 224,
            intra_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    pub units: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            api_key: String::new(),
            units: "metric".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShelfLifeConfig {
    pub base_url: String,
}

impl Default for ShelfLifeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PREDICT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub weather: WeatherConfig,
    pub shelf_life: ShelfLifeConfig,
    pub location: Option<Coordinates>,
    pub default_storage: StorageCondition,
}

impl AppConfig {
    /// Reads `path` if given; a missing file falls back to defaults, an
    /// unreadable or invalid one is an error. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) if !path.exists() => {
                log::warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| AppError::config(format!("Invalid config {}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.weather.api_key = key;
        }
        if let Some(url) = lookup(PREDICT_URL_ENV).filter(|v| !v.is_empty()) {
            self.shelf_life.base_url = url;
        }
    }
}
