//! One user session: the analysis pipeline and its bounded result history.

mod analyzer;
mod history;

pub use analyzer::{AnalysisError, AnalysisReport, Analyzer, AnalyzerConfig};
pub use history::{AnalysisHistory, DEFAULT_HISTORY_LIMIT};
