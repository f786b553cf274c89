use thiserror::Error;

/// Custom error type shared by the stimulus crates.
///
/// I/O and decoder causes are carried as messages so the enum stays
/// `Clone + PartialEq`, which keeps error assertions in tests simple.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum StimulusError {
    /// The configured info mapping could not derive a label from a path.
    #[error("Cannot resolve a label from path '{path}': {reason}")]
    Configuration { path: String, reason: String },

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to decode image '{path}': {message}")]
    ImageDecode { path: String, message: String },

    #[error("No image files found under '{root}'")]
    EmptyDataset { root: String },

    #[error("Index out of bounds: index {index} for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Cannot stack an empty list of tensors")]
    EmptyTensorList,

    #[error("Invalid loader configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid transform pipeline: {0}")]
    InvalidTransform(String),

    #[error("Loader worker failed: {0}")]
    WorkerFailure(String),
}

impl StimulusError {
    /// The file or directory an error refers to, when it names one.
    pub fn path(&self) -> Option<&str> {
        match self {
            StimulusError::Configuration { path, .. }
            | StimulusError::Io { path, .. }
            | StimulusError::ImageDecode { path, .. } => Some(path),
            StimulusError::EmptyDataset { root } => Some(root),
            _ => None,
        }
    }
}
