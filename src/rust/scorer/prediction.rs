use std::convert::TryFrom;
use serde::{Deserialize, Serialize};

use super::error::PredictionError;

/// One ranked output of the image classifier.
///
/// The score is always finite and in [0, 1]; every constructor, including
/// deserialization, goes through [`Prediction::new`] or the
/// [`RawPrediction`] conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct Prediction {
    label: String,
    score: f64,
}

impl Prediction {
    /// Creates a prediction, rejecting scores outside [0, 1] or non-finite values
    ///
    /// # Example
    /// ```
    /// use binwise::Prediction;
    ///
    /// let p = Prediction::new("banana", 0.92).unwrap();
    /// assert_eq!(p.label(), "banana");
    /// assert!(Prediction::new("banana", 1.5).is_err());
    /// ```
    pub fn new(label: impl Into<String>, score: f64) -> Result<Self, PredictionError> {
        let label = label.into();
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(PredictionError::InvalidScore { label, score });
        }
        Ok(Self { label, score })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Score in [0, 1]. Scores across a list need not sum to 1.
    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Loosely shaped prediction as it arrives from a classifier backend or a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPrediction {
    #[serde(default, alias = "class_name", alias = "className")]
    pub label: Option<String>,
    #[serde(default, alias = "confidence", alias = "probability")]
    pub score: Option<f64>,
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = PredictionError;

    /// Requires both fields and a finite score; finite scores are clamped into [0, 1].
    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        let label = raw.label.ok_or(PredictionError::MissingField("label"))?;
        let score = raw.score.ok_or(PredictionError::MissingField("score"))?;
        if !score.is_finite() {
            return Err(PredictionError::InvalidScore { label, score });
        }
        Ok(Self { label, score: score.clamp(0.0, 1.0) })
    }
}

/// Parses a JSON array such as `[{"label": "banana", "score": 0.9}]`
pub fn parse_predictions(json: &str) -> Result<Vec<Prediction>, PredictionError> {
    let raw: Vec<RawPrediction> = serde_json::from_str(json)?;
    raw.into_iter().map(Prediction::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Prediction::new("x", -0.1).is_err());
        assert!(Prediction::new("x", f64::NAN).is_err());
        assert!(Prediction::new("x", 0.0).is_ok());
        assert!(Prediction::new("x", 1.0).is_ok());
    }

    #[test]
    fn test_raw_prediction_is_clamped() {
        let p = Prediction::try_from(RawPrediction {
            label: Some("glass jar".into()),
            score: Some(1.2),
        }).unwrap();
        assert_eq!(p.score(), 1.0);
    }

    #[test]
    fn test_raw_prediction_missing_fields() {
        let err = Prediction::try_from(RawPrediction { label: None, score: Some(0.5) }).unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("label")));
        let err = Prediction::try_from(RawPrediction { label: Some("x".into()), score: None }).unwrap_err();
        assert!(matches!(err, PredictionError::MissingField("score")));
    }

    #[test]
    fn test_parse_predictions_accepts_aliases() {
        let predictions = parse_predictions(
            r#"[{"label": "banana", "score": 0.8}, {"class_name": "orange", "confidence": 0.1}]"#
        ).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[1].label(), "orange");
        assert!(matches!(parse_predictions("{"), Err(PredictionError::Malformed(_))));
    }

    #[test]
    fn test_deserialize_goes_through_coercion() {
        let predictions: Vec<Prediction> = serde_json::from_str(
            r#"[{"label": "banana", "score": 1.0}, {"label": "plastic", "score": -0.5}]"#
        ).unwrap();
        assert_eq!(predictions[1].score(), 0.0);

        let result = crate::scorer::score(&predictions);
        assert!(result.scores.recyclable >= 0.0);
        assert_eq!(result.scores.recyclable, 0.0);

        let missing: Result<Prediction, _> = serde_json::from_str(r#"{"label": "banana"}"#);
        assert!(missing.is_err());
        let aliased: Prediction = serde_json::from_str(r#"{"className": "orange", "probability": 0.4}"#).unwrap();
        assert_eq!(aliased, Prediction::new("orange", 0.4).unwrap());
    }

    #[test]
    fn test_serialized_prediction_reads_back() {
        let p = Prediction::new("glass jar", 0.25).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"label":"glass jar","score":0.25}"#);
    }
}
