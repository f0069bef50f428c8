use crate::config::WeatherConfig;
use crate::error::{AppError, ErrorKind};
use crate::models::weather_types::{Coordinates, WeatherReport, WeatherResponse};
use crate::services::http::endpoint;
use async_trait::async_trait;

const WEATHER_PATH: &str = "data/2.5/weather";

#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current_weather(&self, at: Coordinates) -> Result<WeatherReport, AppError>;
}

/// OpenWeatherMap current-conditions client.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    fn fetch_error(cause: impl std::fmt::Display) -> AppError {
        AppError::new(ErrorKind::Weather, format!("Failed to fetch weather: {}", cause))
    }
}

#[async_trait]
impl WeatherService for WeatherClient {
    async fn current_weather(&self, at: Coordinates) -> Result<WeatherReport, AppError> {
        let url = endpoint(&self.config.base_url, WEATHER_PATH)
            .map_err(|e| e.with_kind(ErrorKind::Weather))?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("appid", self.config.api_key.clone()),
                ("units", self.config.units.clone()),
            ])
            .send()
            .await
            .map_err(Self::fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Weather request failed: HTTP {}", status);
            return Err(AppError::new(
                ErrorKind::Weather,
                format!("Weather API error: HTTP {}", status),
            ));
        }

        let body: WeatherResponse = response.json().await.map_err(Self::fetch_error)?;
        Ok(body.into())
    }
}
