/// Errors raised while turning loosely typed classifier output into predictions.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Prediction is missing its {0} field")]
    MissingField(&'static str),
    #[error("Invalid score {score} for label '{label}': must be a finite number in [0, 1]")]
    InvalidScore { label: String, score: f64 },
    #[error("Malformed prediction list: {0}")]
    Malformed(#[from] serde_json::Error),
}
