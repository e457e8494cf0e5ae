use std::collections::VecDeque;

use crate::scorer::ClassificationResult;

/// Number of results kept when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Bounded, newest-first list of past results. Pushing past the limit evicts the oldest.
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    entries: VecDeque<ClassificationResult>,
    limit: usize,
}

impl Default for AnalysisHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl AnalysisHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, result: ClassificationResult) {
        if self.limit == 0 {
            return;
        }
        self.entries.push_front(result);
        self.entries.truncate(self.limit);
    }

    /// Most recent result, if any
    pub fn latest(&self) -> Option<&ClassificationResult> {
        self.entries.front()
    }

    /// Results from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_vec(&self) -> Vec<ClassificationResult> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{decide, CategoryScoreVector};

    fn result_with_confidence(top: f64) -> ClassificationResult {
        decide(CategoryScoreVector::new(top, 0.0, 0.0))
    }

    #[test]
    fn test_push_is_newest_first() {
        let mut history = AnalysisHistory::default();
        history.push(result_with_confidence(0.5));
        history.push(result_with_confidence(0.6));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().confidence, 90);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = AnalysisHistory::with_limit(0);
        history.push(result_with_confidence(0.5));
        assert!(history.is_empty());
    }
}
