use std::fs;
use std::path::Path;
use std::sync::Arc;
use ort::session::Session;
use log::{info, error};

use super::classifier::OnnxImageClassifier;
use super::error::ClassifierError;
use super::preprocess::parse_labels;
use crate::{BuiltinModel, ModelCharacteristics, ModelManager, runtime::{RuntimeConfig, create_session_builder}};

/// Number of predictions returned when no top-k is configured
pub const DEFAULT_TOP_K: usize = 5;

/// A builder for constructing an OnnxImageClassifier with a fluent interface.
#[derive(Debug)]
pub struct OnnxImageClassifierBuilder {
    model_path: Option<String>,
    labels_path: Option<String>,
    session: Option<Session>,
    labels: Option<Vec<String>>,
    model_characteristics: Option<ModelCharacteristics>,
    runtime_config: RuntimeConfig,
    top_k: usize,
    apply_softmax: bool,
}

impl Default for OnnxImageClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OnnxImageClassifierBuilder {
    /// Creates a new builder with default runtime settings, top-5 output and softmax enabled
    pub fn new() -> Self {
        Self {
            model_path: None,
            labels_path: None,
            session: None,
            labels: None,
            model_characteristics: None,
            runtime_config: RuntimeConfig::default(),
            top_k: DEFAULT_TOP_K,
            apply_softmax: true,
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Must be called before `with_model` or `with_custom_model` to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Limits how many predictions `classify` returns
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Whether to apply softmax to the model output. Disable for models that
    /// already emit probabilities.
    pub fn with_softmax(mut self, apply_softmax: bool) -> Self {
        self.apply_softmax = apply_softmax;
        self
    }

    /// Uses a built-in model from the default model cache
    ///
    /// # Returns
    /// An error if paths are already set, the model is not downloaded, or the
    /// model or labels fail to load.
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = ModelManager::new_default()
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?;
        self.with_model_from(&manager, model)
    }

    /// Uses a built-in model from the given model cache
    pub fn with_model_from(self, manager: &ModelManager, model: BuiltinModel) -> Result<Self, ClassifierError> {
        if !manager.is_model_downloaded(model) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::download_model()",
                model
            )));
        }

        let model_path = manager.get_model_path(model);
        let labels_path = manager.get_labels_path(model);
        let characteristics = model.characteristics();
        self.load(&model_path, &labels_path, characteristics)
    }

    /// Uses a custom ONNX model and labels file
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `labels_path` - Path to a labels file with one label per output class
    /// * `input_size` - Square input edge length; defaults to 224
    pub fn with_custom_model(
        self,
        model_path: &str,
        labels_path: &str,
        input_size: Option<u32>,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || labels_path.is_empty() {
            return Err(ClassifierError::BuildError("Model and labels paths cannot be empty".to_string()));
        }
        if !Path::new(model_path).exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path)));
        }
        if !Path::new(labels_path).exists() {
            return Err(ClassifierError::BuildError(format!("Labels file not found: {}", labels_path)));
        }

        let input_size = input_size.unwrap_or(224);
        if input_size == 0 {
            return Err(ClassifierError::ValidationError("Input size must be positive".into()));
        }

        let characteristics = ModelCharacteristics {
            input_size,
            num_classes: 0,
            model_size_mb: 0,
        };
        self.load(Path::new(model_path), Path::new(labels_path), characteristics)
    }

    fn load(
        mut self,
        model_path: &Path,
        labels_path: &Path,
        mut characteristics: ModelCharacteristics,
    ) -> Result<Self, ClassifierError> {
        if self.model_path.is_some() || self.labels_path.is_some() {
            return Err(ClassifierError::BuildError("Model and labels paths already set".to_string()));
        }

        let labels = Self::load_labels(labels_path)?;
        info!("Loaded {} labels from {:?}", labels.len(), labels_path);

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)?;
        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        characteristics.num_classes = labels.len();
        self.model_characteristics = Some(characteristics);
        self.model_path = Some(model_path.to_string_lossy().to_string());
        self.labels_path = Some(labels_path.to_string_lossy().to_string());
        self.labels = Some(labels);
        self.session = Some(session);
        Ok(self)
    }

    fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
        let text = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read labels file {:?}: {}", path, e);
            ClassifierError::LabelsError(format!("Failed to read {:?}: {}", path, e))
        })?;
        let labels = parse_labels(&text);
        if labels.is_empty() {
            return Err(ClassifierError::LabelsError(format!("Labels file {:?} contains no labels", path)));
        }
        Ok(labels)
    }

    /// Builds and returns the final classifier
    pub fn build(mut self) -> Result<OnnxImageClassifier, ClassifierError> {
        if self.top_k == 0 {
            return Err(ClassifierError::ValidationError("top_k must be at least 1".into()));
        }

        let session = self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?;
        let labels = self.labels.take()
            .ok_or_else(|| ClassifierError::BuildError("No labels loaded".into()))?;
        let model_characteristics = self.model_characteristics.take()
            .ok_or_else(|| ClassifierError::BuildError("Model characteristics not set".to_string()))?;
        let model_path = self.model_path.take()
            .ok_or_else(|| ClassifierError::BuildError("Model path must be set".to_string()))?;
        let labels_path = self.labels_path.take()
            .ok_or_else(|| ClassifierError::BuildError("Labels path must be set".to_string()))?;

        Ok(OnnxImageClassifier {
            model_path,
            labels_path,
            session: Arc::new(session),
            labels: Arc::new(labels),
            model_characteristics,
            top_k: self.top_k,
            apply_softmax: self.apply_softmax,
        })
    }

    /// Requires at least one input (the image batch) and one output (class scores)
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 input for the image tensor".to_string()
            ));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelError(
                "Model must have at least 1 output for class scores".to_string()
            ));
        }
        Ok(())
    }
}
