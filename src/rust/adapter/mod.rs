//! The image classifier collaborator: turns a photo into ranked labels.

mod error;
mod classifier;
mod preprocess;
pub mod builder;

pub use error::ClassifierError;
pub use classifier::{ImageClassifier, OnnxImageClassifier};
pub use builder::{OnnxImageClassifierBuilder, DEFAULT_TOP_K};

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Path to the labels file
    pub labels_path: String,
    /// Number of labels the model can emit
    pub num_labels: usize,
    /// Square input edge length in pixels
    pub input_size: u32,
    /// Number of predictions returned per image
    pub top_k: usize,
}
