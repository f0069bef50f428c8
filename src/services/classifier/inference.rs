use crate::error::AppError;
use crate::models::classify_types::ClassificationResult;
use crate::services::classifier::preprocess::{decode_image, ImageSource, Preprocessor};
use crate::services::classifier::ranker;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;

/// A loaded model that maps one `[1, H, W, 3]` tensor to one row of scores.
pub trait InferenceBackend: Send {
    /// `(width, height)` the model expects, when the model declares it.
    fn input_size(&self) -> Option<(u32, u32)>;

    /// Width of the score row, when the model declares it.
    fn num_classes(&self) -> Option<usize>;

    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError>;
}

pub struct OrtBackend {
    session: Session,
    input_name: String,
    input_size: Option<(u32, u32)>,
    num_classes: Option<usize>,
}

impl OrtBackend {
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self, AppError> {
        let _ = ort::init().with_name("fresh-lens").commit();

        let session = Session::builder()
            .map_err(|e| AppError::model_load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::model_load(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(intra_threads)
            .map_err(|e| AppError::model_load(format!("Failed to set intra threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| {
                AppError::model_load(format!(
                    "Failed to load model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| AppError::model_load("Model declares no inputs"))?;
        let input_name = input.name().to_string();

        let input_size = match input.dtype().tensor_shape() {
            Some(shape) => nhwc_input_size(shape)?,
            None => return Err(AppError::model_load("Model input is not a tensor")),
        };

        let num_classes = session
            .outputs()
            .first()
            .and_then(|output| output.dtype().tensor_shape())
            .and_then(|shape| shape.last().copied())
            .filter(|&n| n > 0)
            .map(|n| n as usize);

        Ok(Self {
            session,
            input_name,
            input_size,
            num_classes,
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn input_size(&self) -> Option<(u32, u32)> {
        self.input_size
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    fn run(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AppError> {
        let input_tensor = Value::from_array(input)
            .map_err(|e| AppError::classification(format!("Failed to create tensor value: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| AppError::classification(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::classification("Model produced no outputs"))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::classification(format!("Failed to extract output tensor: {}", e)))?;

        Ok(data.to_vec())
    }
}

/// `(width, height)` from an NHWC `[1, H, W, 3]` input shape. Dynamic H or W
/// (reported as -1) yields `None`; any other layout is rejected.
pub fn nhwc_input_size(shape: &[i64]) -> Result<Option<(u32, u32)>, AppError> {
    if shape.len() != 4 || shape[3] != 3 {
        return Err(AppError::model_load(format!(
            "Expected model input [1, H, W, 3], got {:?}",
            shape
        )));
    }
    if shape[1] <= 0 || shape[2] <= 0 {
        return Ok(None);
    }
    Ok(Some((shape[2] as u32, shape[1] as u32)))
}

/// Reads a newline-delimited label file. Blank lines are skipped, so the
/// remaining line count must equal the model's output width.
pub fn load_labels(path: &Path) -> Result<Vec<String>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::model_load(format!("Failed to read labels {}: {}", path.display(), e))
    })?;

    let labels: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        return Err(AppError::model_load(format!(
            "Label file {} is empty",
            path.display()
        )));
    }

    Ok(labels)
}

/// A loaded model plus its labels. Read-only after construction apart from
/// the backend, which is serialized behind a mutex.
pub struct InferenceEngine {
    backend: Mutex<Box<dyn InferenceBackend>>,
    labels: Vec<String>,
    preprocessor: Preprocessor,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("labels", &self.labels.len())
            .field("preprocessor", &self.preprocessor)
            .finish()
    }
}

impl InferenceEngine {
    pub fn new(
        backend: Box<dyn InferenceBackend>,
        labels: Vec<String>,
        fallback_input_size: u32,
    ) -> Result<Self, AppError> {
        if let Some(n) = backend.num_classes() {
            if n != labels.len() {
                return Err(AppError::model_load(format!(
                    "Label count {} does not match model output width {}",
                    labels.len(),
                    n
                )));
            }
        }

        let (width, height) = backend
            .input_size()
            .unwrap_or((fallback_input_size, fallback_input_size));

        Ok(Self {
            backend: Mutex::new(backend),
            labels,
            preprocessor: Preprocessor::new(width, height),
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn preprocessor(&self) -> Preprocessor {
        self.preprocessor
    }

    /// Scores for every label, in label-file order. Any runtime failure
    /// degrades to an empty list.
    pub fn classify(&self, input: Array4<f32>) -> Vec<(String, f32)> {
        match self.try_classify(input) {
            Ok(scores) => scores,
            Err(e) => {
                log::error!("Error running classification: {}", e);
                Vec::new()
            }
        }
    }

    fn try_classify(&self, input: Array4<f32>) -> Result<Vec<(String, f32)>, AppError> {
        let scores = {
            let mut backend = self
                .backend
                .lock()
                .map_err(|_| AppError::classification("Model lock poisoned"))?;
            backend.run(input)?
        };

        if scores.len() != self.labels.len() {
            return Err(AppError::classification(format!(
                "Model produced {} scores for {} labels",
                scores.len(),
                self.labels.len()
            )));
        }

        Ok(self.labels.iter().cloned().zip(scores).collect())
    }

    pub fn classify_image(&self, img: &DynamicImage) -> Vec<ClassificationResult> {
        let tensor = self.preprocessor.preprocess(img);
        ranker::top_results(self.classify(tensor))
    }

    /// Decode, preprocess, infer and rank. Only decoding can fail.
    pub fn classify_source(&self, source: &ImageSource) -> Result<Vec<ClassificationResult>, AppError> {
        let img = decode_image(source)?;
        Ok(self.classify_image(&img))
    }
}
