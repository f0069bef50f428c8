use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// How the food is being kept. Sent verbatim (display name) to the
/// prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageCondition {
    #[default]
    Open,
    Refrigerated,
    Airtight,
    Frozen,
}

impl StorageCondition {
    pub const ALL: [StorageCondition; 4] = [
        StorageCondition::Open,
        StorageCondition::Refrigerated,
        StorageCondition::Airtight,
        StorageCondition::Frozen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageCondition::Open => "Open",
            StorageCondition::Refrigerated => "Refrigerated",
            StorageCondition::Airtight => "Airtight",
            StorageCondition::Frozen => "Frozen",
        }
    }
}

impl fmt::Display for StorageCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageCondition {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::config(format!("Unknown storage condition: {}", s)))
    }
}

impl TryFrom<String> for StorageCondition {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShelfLifeRequest {
    pub dish_name: String,
    pub temperature: f64,
    pub humidity: f64,
    pub storage: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShelfLifeResponse {
    pub raw_hours: f64,
    pub adjusted_hours: f64,
    pub formatted: String,
}
