use serde::Serialize;
use thiserror::Error;

/// Failure categories surfaced to the user. None of them is fatal; every
/// failure returns control to an interactive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ModelLoad,
    ImageDecode,
    Classification,
    LocationDenied,
    LocationUnavailable,
    Weather,
    ShelfLife,
    Config,
    Internal,
}

#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        AppError {
            kind,
            message: message.into(),
        }
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelLoad, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ImageDecode, message)
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Classification, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Re-tags an error with another kind, keeping its message.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorKind::Internal, err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::new(ErrorKind::ImageDecode, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::new(ErrorKind::Internal, err.to_string())
    }
}

impl From<ort::Error> for AppError {
    fn from(err: ort::Error) -> Self {
        AppError::new(ErrorKind::Classification, err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::new(ErrorKind::Config, err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::new(ErrorKind::Internal, msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::new(ErrorKind::Internal, msg)
    }
}
