use serde::{Deserialize, Serialize};

use super::category::{CategoryScoreVector, ClassificationResult, WasteCategory};
use super::keywords::KeywordTable;
use super::prediction::Prediction;

/// Weight of a label token that is exactly a keyword
pub const TOKEN_WEIGHT: f64 = 1.6;
/// Weight of a keyword found anywhere inside the lowercased label
pub const SUBSTRING_WEIGHT: f64 = 0.9;

const ORGANIC_BONUS_TERMS: &[&str] = &["food", "edible"];
const ORGANIC_BONUS: f64 = 0.8;
const HAZARDOUS_BONUS_TERMS: &[&str] = &["electronic", "device", "battery"];
const HAZARDOUS_BONUS: f64 = 1.2;
const RECYCLABLE_BONUS_TERMS: &[&str] = &["container", "packaging", "wrapper"];
const RECYCLABLE_BONUS: f64 = 0.6;

const TOTAL_FLOOR: f64 = 1e-6;
const RATIO_EPSILON: f64 = 1e-9;

/// Below this top score the scorer abstains
pub const MIN_TOP_SCORE: f64 = 0.18;
/// Minimum ratio between first and second place before committing
pub const MIN_MARGIN_RATIO: f64 = 1.25;
/// Highest confidence ever reported
pub const MAX_CONFIDENCE: f64 = 99.0;

/// Un-normalized per-category accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCategoryScores {
    pub recyclable: f64,
    pub organic: f64,
    pub hazardous: f64,
}

impl RawCategoryScores {
    fn add(&mut self, category: WasteCategory, amount: f64) {
        match category {
            WasteCategory::Recyclable => self.recyclable += amount,
            WasteCategory::Organic => self.organic += amount,
            WasteCategory::Hazardous => self.hazardous += amount,
            WasteCategory::Unknown => {}
        }
    }

    pub fn total(&self) -> f64 {
        self.recyclable + self.organic + self.hazardous
    }

    /// Divides by the floored total. An exactly zero total yields an exact zero vector.
    pub fn normalize(&self) -> CategoryScoreVector {
        let raw_total = self.total();
        if raw_total == 0.0 {
            return CategoryScoreVector::default();
        }
        let total = raw_total.max(TOTAL_FLOOR);
        CategoryScoreVector::new(
            self.recyclable / total,
            self.organic / total,
            self.hazardous / total,
        )
    }
}

/// Lowercases the label, blanks out anything outside `[a-z0-9 ]` and splits on whitespace
pub fn tokenize(label: &str) -> Vec<String> {
    let cleaned: String = label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn accumulate_one(scores: &mut RawCategoryScores, prediction: &Prediction) {
    let weight = prediction.score();
    let lowered = prediction.label().to_lowercase();
    let tokens = tokenize(prediction.label());

    for token in &tokens {
        for set in KeywordTable::sets() {
            if set.contains_token(token) {
                scores.add(set.category(), weight * TOKEN_WEIGHT);
            }
        }
    }

    for set in KeywordTable::sets() {
        for keyword in set.words() {
            if lowered.contains(keyword) {
                scores.add(set.category(), weight * SUBSTRING_WEIGHT);
            }
        }
    }

    if contains_any(&lowered, ORGANIC_BONUS_TERMS) {
        scores.organic += weight * ORGANIC_BONUS;
    }
    if contains_any(&lowered, HAZARDOUS_BONUS_TERMS) {
        scores.hazardous += weight * HAZARDOUS_BONUS;
    }
    if contains_any(&lowered, RECYCLABLE_BONUS_TERMS) {
        scores.recyclable += weight * RECYCLABLE_BONUS;
    }
}

/// Runs the token, substring and bonus passes over every prediction.
///
/// A keyword that is both a whole token and a substring of the label is
/// counted by both passes.
pub fn accumulate(predictions: &[Prediction]) -> RawCategoryScores {
    let mut scores = RawCategoryScores::default();
    for prediction in predictions {
        accumulate_one(&mut scores, prediction);
    }
    scores
}

/// Picks a category from a score vector, abstaining when the winner is weak or
/// too close to the runner-up.
pub fn decide(scores: CategoryScoreVector) -> ClassificationResult {
    let ranked = scores.ranked();
    let (top_category, top) = ranked[0];
    let (_, second) = ranked[1];

    if top < MIN_TOP_SCORE || top / (second + RATIO_EPSILON) < MIN_MARGIN_RATIO {
        let confidence = to_confidence(top * 100.0);
        return ClassificationResult::for_category(WasteCategory::Unknown, confidence, scores);
    }

    let confidence = to_confidence((top * 100.0 + (top - second) * 50.0).min(MAX_CONFIDENCE));
    ClassificationResult::for_category(top_category, confidence, scores)
}

fn to_confidence(value: f64) -> u8 {
    value.round().clamp(0.0, MAX_CONFIDENCE) as u8
}

/// Maps classifier predictions onto a waste category.
///
/// Pure and deterministic; an empty list yields [`WasteCategory::Unknown`].
///
/// # Example
/// ```
/// use binwise::{score, Prediction, WasteCategory};
///
/// let result = score(&[Prediction::new("banana", 1.0).unwrap()]);
/// assert_eq!(result.category, WasteCategory::Organic);
/// assert_eq!(result.confidence, 99);
/// ```
pub fn score(predictions: &[Prediction]) -> ClassificationResult {
    decide(accumulate(predictions).normalize())
}
