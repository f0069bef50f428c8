use serde::Serialize;

/// A single ranked prediction: the class label and its score in [0, 1].
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub score: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ModelStatus {
    pub loaded: bool,
    pub error: Option<String>,
    pub input_width: Option<u32>,
    pub input_height: Option<u32>,
    pub num_labels: Option<usize>,
}
