pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod games;
pub mod model;
pub mod preprocess;
pub mod runner;
pub mod slot;

pub use capture::{run_capture, spawn_capture, CameraSource, FrameSource};
pub use cli::{execute, run_cli, Cli, Commands, ConfigSubcommand, SessionArgs};
pub use error::{CaptureError, InferError, LoadError, PreprocessError};
pub use frame::Frame;
pub use model::{load_labels, Classification, Classifier, ModelBackend, OnnxBackend};
pub use preprocess::normalize;
pub use slot::ResultSlot;
