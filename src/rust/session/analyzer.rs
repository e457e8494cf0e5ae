use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use log::{debug, info, warn};

use super::history::{AnalysisHistory, DEFAULT_HISTORY_LIMIT};
use crate::adapter::{ClassifierError, ImageClassifier};
use crate::scorer::{score, ClassificationResult, Prediction};

/// Settings for the analysis pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// How many raw predictions a report keeps for display
    pub shown_predictions: usize,
    /// How many past results the history retains
    pub history_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            shown_predictions: 5,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Everything produced by one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub result: ClassificationResult,
    /// Raw classifier output, truncated for display
    pub top_predictions: Vec<Prediction>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("An analysis is already in progress")]
    Busy,
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifierError),
    #[error("Classification task failed: {0}")]
    TaskFailed(String),
    #[error("Could not read image file: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// Clears the busy flag when the analysis ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs image → classifier → scorer and records results in a bounded history.
///
/// At most one analysis runs at a time; a second call while one is pending
/// fails with [`AnalysisError::Busy`].
pub struct Analyzer<C> {
    classifier: Arc<C>,
    config: AnalyzerConfig,
    history: Mutex<AnalysisHistory>,
    busy: AtomicBool,
}

impl<C: ImageClassifier + 'static> Analyzer<C> {
    pub fn new(classifier: C) -> Self {
        Self::with_config(classifier, AnalyzerConfig::default())
    }

    pub fn with_config(classifier: C, config: AnalyzerConfig) -> Self {
        Self {
            classifier: Arc::new(classifier),
            history: Mutex::new(AnalysisHistory::with_limit(config.history_limit)),
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Classifies and scores one image, then records the result.
    ///
    /// A failed classification is returned as is, leaves the history
    /// untouched and is not retried.
    pub async fn analyze(&self, image: DynamicImage) -> Result<AnalysisReport, AnalysisError> {
        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            warn!("Rejected analysis: another one is still running");
            return Err(AnalysisError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let classifier = Arc::clone(&self.classifier);
        let predictions = tokio::task::spawn_blocking(move || classifier.classify(&image))
            .await
            .map_err(|e| AnalysisError::TaskFailed(e.to_string()))??;
        debug!("Classifier returned {} predictions", predictions.len());

        let result = score(&predictions);
        info!("Classified as {} ({}% confidence)", result.category, result.confidence);

        self.history.lock().await.push(result.clone());

        let mut top_predictions = predictions;
        top_predictions.truncate(self.config.shown_predictions);
        Ok(AnalysisReport { result, top_predictions })
    }

    /// Decodes encoded image bytes and analyzes them
    pub async fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport, AnalysisError> {
        let image = image::load_from_memory(bytes).map_err(ClassifierError::from)?;
        self.analyze(image).await
    }

    /// Reads an image file and analyzes it. A missing or unreadable file is
    /// reported like any other failed analysis.
    pub async fn analyze_file(&self, path: impl AsRef<Path>) -> Result<AnalysisReport, AnalysisError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.analyze_bytes(&bytes).await
    }

    /// Snapshot of past results, newest first
    pub async fn history(&self) -> Vec<ClassificationResult> {
        self.history.lock().await.to_vec()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::WasteCategory;

    struct FixedClassifier(Vec<Prediction>);

    impl ImageClassifier for FixedClassifier {
        fn classify(&self, _image: &DynamicImage) -> Result<Vec<Prediction>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_report_truncates_predictions() {
        let predictions = (0..8)
            .map(|i| Prediction::new(format!("banana {}", i), 0.1).unwrap())
            .collect();
        let analyzer = Analyzer::new(FixedClassifier(predictions));
        let report = analyzer.analyze(DynamicImage::new_rgb8(2, 2)).await.unwrap();
        assert_eq!(report.top_predictions.len(), 5);
        assert_eq!(report.result.category, WasteCategory::Organic);
        assert!(!analyzer.is_busy());
    }

    #[tokio::test]
    async fn test_undecodable_bytes_are_unsupported() {
        let analyzer = Analyzer::new(FixedClassifier(vec![]));
        let err = analyzer.analyze_bytes(b"not an image").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Classification(ClassifierError::UnsupportedImage(_))));
        assert!(analyzer.history().await.is_empty());
    }
}
