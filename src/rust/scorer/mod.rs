//! Keyword scoring that turns free-text image labels into a waste category.

mod category;
mod error;
mod keywords;
mod prediction;
mod scoring;

pub use category::{CategoryScoreVector, ClassificationResult, WasteCategory};
pub use error::PredictionError;
pub use keywords::{KeywordSet, KeywordTable};
pub use prediction::{parse_predictions, Prediction, RawPrediction};
pub use scoring::{
    accumulate, decide, score, tokenize, RawCategoryScores, MAX_CONFIDENCE, MIN_MARGIN_RATIO,
    MIN_TOP_SCORE, SUBSTRING_WEIGHT, TOKEN_WEIGHT,
};
