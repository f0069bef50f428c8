use crate::error::{AppError, ErrorKind};
use crate::models::weather_types::Coordinates;
use async_trait::async_trait;

pub const PERMISSION_DENIED_MESSAGE: &str =
    "Location permission denied. Allow location access to fetch local weather.";

/// Source of a coarse device location fix.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinates, AppError>;
}

/// A location known up front (configuration or command line).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, AppError> {
        Ok(self.0)
    }
}

/// Stands in when no location is available at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation {
    pub denied: bool,
}

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_location(&self) -> Result<Coordinates, AppError> {
        if self.denied {
            return Err(permission_denied());
        }
        Err(AppError::new(
            ErrorKind::LocationUnavailable,
            "Could not determine current location: no location source configured",
        ))
    }
}

pub fn permission_denied() -> AppError {
    AppError::new(ErrorKind::LocationDenied, PERMISSION_DENIED_MESSAGE)
}
