use crate::error::{InferError, LoadError};
use candle_core::Tensor;
use candle_onnx::{onnx::ModelProto, read_file, simple_eval};
use hf_hub::api::sync::Api;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The winning label and its softmax score for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f32,
}

/// Runs a prepared input tensor through a loaded model and returns the raw
/// per-class output vector. The session behind the backend is read-only
/// shared across calls.
pub trait ModelBackend: Send {
    fn run(&self, input: &Tensor) -> Result<Vec<f32>, InferError>;
}

/// ONNX model evaluated on CPU, input and output names taken from the graph.
pub struct OnnxBackend {
    model: ModelProto,
    input_name: String,
    output_name: String,
}

impl OnnxBackend {
    pub fn load(model_dir: &Path) -> Result<Self, LoadError> {
        let path = resolve_model_file(model_dir)?;
        let model = read_file(&path).map_err(|e| LoadError::Model(e.to_string()))?;
        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| LoadError::Model("model graph missing".into()))?;
        let input_name = graph
            .input
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| LoadError::Model("model has no input".into()))?;
        let output_name = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| LoadError::Model("model has no output".into()))?;
        debug!(path = %path.display(), input = %input_name, output = %output_name, "model loaded");
        Ok(Self {
            model,
            input_name,
            output_name,
        })
    }
}

fn resolve_model_file(model_dir: &Path) -> Result<PathBuf, LoadError> {
    let local = model_dir.join("model.onnx");
    if local.exists() {
        return Ok(local);
    }
    let repo = std::env::var("GESTURE_MODEL_REPO").map_err(|_| {
        LoadError::Model(format!(
            "{} not found and GESTURE_MODEL_REPO is unset",
            local.display()
        ))
    })?;
    let filename =
        std::env::var("GESTURE_MODEL_FILE").unwrap_or_else(|_| "model.onnx".to_string());
    debug!(repo = %repo, file = %filename, "fetching model from hub");
    Api::new()
        .and_then(|api| api.model(repo).get(&filename))
        .map_err(|e| LoadError::Model(e.to_string()))
}

impl ModelBackend for OnnxBackend {
    fn run(&self, input: &Tensor) -> Result<Vec<f32>, InferError> {
        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.clone(), input.clone());
        let mut outputs =
            simple_eval(&self.model, inputs).map_err(|e| InferError::Backend(e.to_string()))?;
        let output = outputs
            .remove(&self.output_name)
            .ok_or_else(|| InferError::MissingOutput(self.output_name.clone()))?;
        output
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(|e| InferError::Backend(e.to_string()))
    }
}

/// Pairs a backend with the label list and reduces one output vector to the
/// winning (label, confidence) pair.
pub struct Classifier {
    backend: Box<dyn ModelBackend>,
    labels: Vec<String>,
}

impl Classifier {
    pub fn new(backend: Box<dyn ModelBackend>, labels: Vec<String>) -> Result<Self, LoadError> {
        if labels.is_empty() {
            return Err(LoadError::EmptyLabels);
        }
        Ok(Self { backend, labels })
    }

    /// Loads `model.onnx` and `labels.txt` from one directory.
    pub fn from_model_dir(dir: &Path) -> Result<Self, LoadError> {
        let backend = OnnxBackend::load(dir)?;
        let labels = load_labels(&dir.join("labels.txt"))?;
        Self::new(Box::new(backend), labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Runs the tensor through the backend and picks the winning class with
    /// a scanning max: ties resolve to the lowest index, so the first label
    /// reaching the maximum always wins. Deterministic for a fixed backend.
    /// The input tensor is consumed and dropped on every exit path.
    pub fn classify(&self, input: Tensor) -> Result<Classification, InferError> {
        let scores = self.backend.run(&input)?;
        if scores.len() != self.labels.len() {
            return Err(InferError::OutputLength {
                expected: self.labels.len(),
                actual: scores.len(),
            });
        }
        let mut best = 0usize;
        for (i, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = i;
            }
        }
        Ok(Classification {
            label: self.labels[best].clone(),
            confidence: scores[best],
        })
    }
}

/// Reads the label file: one label per line, order matching the model output
/// vector. Blank lines are dropped.
pub fn load_labels(path: &Path) -> Result<Vec<String>, LoadError> {
    let text = fs::read_to_string(path)
        .map_err(|e| LoadError::Labels(format!("{}: {e}", path.display())))?;
    let labels: Vec<String> = text
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if labels.is_empty() {
        return Err(LoadError::EmptyLabels);
    }
    Ok(labels)
}
