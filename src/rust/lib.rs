//! Sorts photos of waste into recyclable, organic or hazardous.
//!
//! An image classifier produces free-text labels ("banana", "pop bottle",
//! "cellular telephone"); the keyword scorer maps them onto a waste category
//! with a confidence, a description and disposal tips, or abstains with
//! [`WasteCategory::Unknown`] when the evidence is weak or ambiguous.
//!
//! # Scoring labels
//!
//! The scorer is pure and needs no model:
//!
//! ```rust
//! use binwise::{score, Prediction, WasteCategory};
//!
//! let predictions = vec![
//!     Prediction::new("plastic bottle", 0.71).unwrap(),
//!     Prediction::new("water jug", 0.12).unwrap(),
//! ];
//! let result = score(&predictions);
//! assert_eq!(result.category, WasteCategory::Recyclable);
//! assert!(result.confidence <= 99);
//! ```
//!
//! # Classifying photos
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use binwise::{Analyzer, BuiltinModel, ModelManager, OnnxImageClassifier};
//!
//! let manager = ModelManager::new_default()?;
//! manager.ensure_model_downloaded(BuiltinModel::MobileNetV2).await?;
//!
//! let classifier = OnnxImageClassifier::builder()
//!     .with_model(BuiltinModel::MobileNetV2)?
//!     .build()?;
//! let analyzer = Analyzer::new(classifier);
//!
//! let report = analyzer.analyze(image::open("photo.jpg")?).await?;
//! println!("{} ({}%)", report.result.category, report.result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
mod runtime;
pub mod model_manager;
pub mod models;
pub mod scorer;
pub mod session;

pub use adapter::{ClassifierError, ClassifierInfo, ImageClassifier, OnnxImageClassifier, OnnxImageClassifierBuilder};
pub use runtime::{OptimizationLevel, RuntimeConfig, create_session_builder};
pub use model_manager::{ModelManager, ModelError};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use scorer::{
    accumulate, decide, parse_predictions, score, CategoryScoreVector, ClassificationResult,
    KeywordTable, Prediction, PredictionError, RawCategoryScores, RawPrediction, WasteCategory,
};
pub use session::{AnalysisError, AnalysisHistory, AnalysisReport, Analyzer, AnalyzerConfig};

pub fn init_logger() {
    env_logger::init();
}
