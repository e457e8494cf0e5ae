use ort::Error as OrtError;
use std::fmt;

use crate::scorer::PredictionError;

/// Represents the different types of errors that can occur while classifying an image.
#[derive(Debug)]
pub enum ClassifierError {
    /// Error occurred while loading or running the ONNX model
    ModelError(String),
    /// Error occurred while reading or parsing the labels file
    LabelsError(String),
    /// Error occurred during the build phase
    BuildError(String),
    /// Error occurred while turning model output into predictions
    PredictionError(String),
    /// Error occurred due to invalid configuration or input parameters
    ValidationError(String),
    /// The image could not be decoded
    UnsupportedImage(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::LabelsError(msg) => write!(f, "Labels error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::UnsupportedImage(msg) => write!(f, "Unsupported image: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<OrtError> for ClassifierError {
    fn from(err: OrtError) -> Self {
        ClassifierError::ModelError(err.to_string())
    }
}

impl From<PredictionError> for ClassifierError {
    fn from(err: PredictionError) -> Self {
        ClassifierError::PredictionError(err.to_string())
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        ClassifierError::UnsupportedImage(err.to_string())
    }
}
