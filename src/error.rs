use std::fmt;

/// Startup failure: the model or its label list could not be loaded.
/// Fatal, nothing can be classified without them.
#[derive(Debug)]
pub enum LoadError {
    Model(String),
    Labels(String),
    EmptyLabels,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Model(msg) => write!(f, "failed to load model: {msg}"),
            LoadError::Labels(msg) => write!(f, "failed to load labels: {msg}"),
            LoadError::EmptyLabels => write!(f, "label file contains no labels"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Camera failure. `Open` is fatal at startup; `Stream` and `EndOfStream`
/// terminate the capture loop.
#[derive(Debug)]
pub enum CaptureError {
    Open(String),
    Stream(String),
    EndOfStream,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Open(msg) => write!(f, "failed to open camera: {msg}"),
            CaptureError::Stream(msg) => write!(f, "camera stream error: {msg}"),
            CaptureError::EndOfStream => write!(f, "camera reported end of stream"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Per-frame preprocessing failure. Recoverable: the frame is skipped.
#[derive(Debug)]
pub enum PreprocessError {
    BufferLength { expected: usize, actual: usize },
    Tensor(String),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreprocessError::BufferLength { expected, actual } => {
                write!(f, "malformed frame: expected {expected} bytes, got {actual}")
            }
            PreprocessError::Tensor(msg) => write!(f, "failed to build input tensor: {msg}"),
        }
    }
}

impl std::error::Error for PreprocessError {}

/// Per-frame inference failure. Recoverable: the frame is skipped.
#[derive(Debug)]
pub enum InferError {
    Backend(String),
    MissingOutput(String),
    OutputLength { expected: usize, actual: usize },
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Backend(msg) => write!(f, "backend error: {msg}"),
            InferError::MissingOutput(name) => write!(f, "model output {name} missing"),
            InferError::OutputLength { expected, actual } => {
                write!(f, "output length {actual} does not match {expected} labels")
            }
        }
    }
}

impl std::error::Error for InferError {}
