use crate::config::ShelfLifeConfig;
use crate::error::{AppError, ErrorKind};
use crate::models::shelf_life_types::{ShelfLifeRequest, ShelfLifeResponse};
use crate::services::http::endpoint;
use async_trait::async_trait;

const PREDICT_PATH: &str = "predict";

#[async_trait]
pub trait ShelfLifeService: Send + Sync {
    async fn predict(&self, request: &ShelfLifeRequest) -> Result<ShelfLifeResponse, AppError>;
}

#[derive(Clone)]
pub struct ShelfLifeClient {
    client: reqwest::Client,
    config: ShelfLifeConfig,
}

impl ShelfLifeClient {
    pub fn new(config: ShelfLifeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: ShelfLifeConfig) -> Self {
        Self { client, config }
    }

    fn request_error(cause: impl std::fmt::Display) -> AppError {
        AppError::new(ErrorKind::ShelfLife, format!("Failed to get prediction: {}", cause))
    }
}

#[async_trait]
impl ShelfLifeService for ShelfLifeClient {
    async fn predict(&self, request: &ShelfLifeRequest) -> Result<ShelfLifeResponse, AppError> {
        let url = endpoint(&self.config.base_url, PREDICT_PATH)
            .map_err(|e| e.with_kind(ErrorKind::ShelfLife))?;

        log::debug!(
            "Requesting shelf life for {} ({} C, {}%, {})",
            request.dish_name,
            request.temperature,
            request.humidity,
            request.storage
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Prediction request failed: HTTP {}", status);
            return Err(AppError::new(
                ErrorKind::ShelfLife,
                format!("Prediction API error: HTTP {}", status),
            ));
        }

        response.json().await.map_err(Self::request_error)
    }
}
