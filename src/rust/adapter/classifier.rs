use std::collections::HashMap;
use std::sync::Arc;
use image::DynamicImage;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::preprocess::{image_to_tensor, softmax, top_k};
use crate::scorer::{Prediction, RawPrediction};
use crate::ModelCharacteristics;

/// A source of ranked image labels.
///
/// Implementations return predictions ordered by descending score. The list
/// may be empty. Failures are reported once and never retried here.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError>;
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for Arc<T> {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        (**self).classify(image)
    }
}

/// A thread-safe image classifier backed by an ONNX model.
///
/// This type is `Send + Sync`; the session and labels are shared through `Arc`.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use binwise::{BuiltinModel, ImageClassifier, OnnxImageClassifier};
///
/// let classifier = OnnxImageClassifier::builder()
///     .with_model(BuiltinModel::MobileNetV2)?
///     .with_top_k(5)
///     .build()?;
///
/// let image = image::open("photo.jpg")?;
/// for prediction in classifier.classify(&image)? {
///     println!("{}: {:.2}", prediction.label(), prediction.score());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OnnxImageClassifier {
    pub model_path: String,
    pub labels_path: String,
    pub session: Arc<Session>,
    pub labels: Arc<Vec<String>>,
    pub model_characteristics: ModelCharacteristics,
    pub top_k: usize,
    pub apply_softmax: bool,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxImageClassifier>();
    }
};

impl OnnxImageClassifier {
    /// Creates a new OnnxImageClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::OnnxImageClassifierBuilder {
        super::builder::OnnxImageClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            labels_path: self.labels_path.clone(),
            num_labels: self.labels.len(),
            input_size: self.model_characteristics.input_size,
            top_k: self.top_k,
        }
    }

    fn run_model(&self, image: &DynamicImage) -> Result<Vec<f32>, ClassifierError> {
        let input = image_to_tensor(image, self.model_characteristics.input_size);
        let input_name = self.session.inputs.first()
            .map(|input| input.name.clone())
            .ok_or_else(|| ClassifierError::ModelError("Model has no inputs".into()))?;

        let mut input_tensors = HashMap::new();
        input_tensors.insert(input_name, Tensor::from_array(input)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output.iter().copied().collect())
    }
}

impl ImageClassifier for OnnxImageClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
        let raw = self.run_model(image)?;
        if raw.len() != self.labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model produced {} scores but {} labels are loaded",
                raw.len(),
                self.labels.len()
            )));
        }

        let scores = if self.apply_softmax { softmax(&raw) } else { raw };
        let predictions = top_k(&scores, self.top_k)
            .into_iter()
            .map(|(index, score)| {
                Prediction::try_from(RawPrediction {
                    label: Some(self.labels[index].clone()),
                    score: Some(f64::from(score)),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Top predictions: {:?}", predictions);
        Ok(predictions)
    }
}
