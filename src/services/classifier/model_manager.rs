use crate::config::ModelConfig;
use crate::error::AppError;
use crate::models::classify_types::{ClassificationResult, ModelStatus};
use crate::services::classifier::inference::{load_labels, InferenceEngine, OrtBackend};
use crate::services::classifier::preprocess::ImageSource;
use std::sync::Arc;
use tokio::sync::OnceCell;

type Loader = Arc<dyn Fn() -> Result<InferenceEngine, AppError> + Send + Sync>;

/// Owns the one-time model load. The first caller pays for loading; the
/// outcome, success or failure, is kept for the rest of the session.
#[derive(Clone)]
pub struct ModelManager {
    loader: Loader,
    engine: Arc<OnceCell<Result<Arc<InferenceEngine>, AppError>>>,
}

impl ModelManager {
    pub fn new(config: ModelConfig) -> Self {
        Self::with_loader(move || {
            let labels = load_labels(&config.labels_path)?;
            let backend = OrtBackend::load(&config.model_path, config.intra_threads)?;
            InferenceEngine::new(Box::new(backend), labels, config.fallback_input_size)
        })
    }

    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<InferenceEngine, AppError> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            engine: Arc::new(OnceCell::new()),
        }
    }

    pub fn from_engine(engine: InferenceEngine) -> Self {
        let manager = Self::with_loader(|| Err(AppError::model_load("Model already supplied")));
        let _ = manager.engine.set(Ok(Arc::new(engine)));
        manager
    }

    pub async fn engine(&self) -> Result<Arc<InferenceEngine>, AppError> {
        self.engine
            .get_or_init(|| async {
                let loader = self.loader.clone();
                let loaded = tokio::task::spawn_blocking(move || (*loader)())
                    .await
                    .map_err(|e| AppError::model_load(format!("Failed to spawn model loading task: {}", e)))
                    .and_then(|r| r);

                match loaded {
                    Ok(engine) => {
                        let p = engine.preprocessor();
                        log::info!(
                            "Model loaded successfully. Input shape: {} x {}, {} labels",
                            p.width,
                            p.height,
                            engine.labels().len()
                        );
                        Ok(Arc::new(engine))
                    }
                    Err(e) => {
                        log::error!("Error initializing classifier: {}", e);
                        Err(AppError::model_load(format!(
                            "Failed to initialize classifier: {}",
                            e.message
                        )))
                    }
                }
            })
            .await
            .clone()
    }

    /// Decodes and classifies off the async runtime threads.
    pub async fn classify(&self, source: ImageSource) -> Result<Vec<ClassificationResult>, AppError> {
        let engine = self.engine().await?;
        tokio::task::spawn_blocking(move || engine.classify_source(&source))
            .await
            .map_err(|e| AppError::classification(format!("Task join failed: {}", e)))?
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.engine.get(), Some(Ok(_)))
    }

    pub fn status(&self) -> ModelStatus {
        match self.engine.get() {
            Some(Ok(engine)) => {
                let p = engine.preprocessor();
                ModelStatus {
                    loaded: true,
                    error: None,
                    input_width: Some(p.width),
                    input_height: Some(p.height),
                    num_labels: Some(engine.labels().len()),
                }
            }
            Some(Err(e)) => ModelStatus {
                loaded: false,
                error: Some(e.message.clone()),
                input_width: None,
                input_height: None,
                num_labels: None,
            },
            None => ModelStatus {
                loaded: false,
                error: None,
                input_width: None,
                input_height: None,
                num_labels: None,
            },
        }
    }
}
