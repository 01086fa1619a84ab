//! Run accounting: per-category stats and the aggregated run report.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Accounting for one category's processing loop.
///
/// Mutated only by the sync driver while the category is being processed,
/// read-only afterward. Invariant: `success + failed <= total` while
/// processing, `== total` once the category finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub name: String,
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Set when the category's enumeration call failed; `total` is zero
    /// and no items were processed.
    pub enumeration_error: Option<String>,
}

impl CategoryStats {
    pub(crate) fn new(name: impl Into<String>, total: usize) -> Self {
        Self {
            name: name.into(),
            total,
            success: 0,
            failed: 0,
            enumeration_error: None,
        }
    }

    pub(crate) fn enumeration_failed(name: impl Into<String>, reason: String) -> Self {
        Self {
            name: name.into(),
            total: 0,
            success: 0,
            failed: 0,
            enumeration_error: Some(reason),
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.success += 1;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Fraction of successful items, or `None` for an empty category
    /// (rendered as "n/a" rather than claiming 100%).
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.success as f64 / self.total as f64)
        }
    }
}

/// Aggregated outcome of one full sync pass across all categories.
///
/// Totals are pure sums over the per-category stats; nothing here is
/// independently mutated.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub categories: Vec<CategoryStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `true` when the run was cancelled between items and the report
    /// reflects partial completion.
    pub cancelled: bool,
}

impl RunReport {
    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.total).sum()
    }

    pub fn total_success(&self) -> usize {
        self.categories.iter().map(|c| c.success).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.categories.iter().map(|c| c.failed).sum()
    }

    /// Overall success fraction, defined as 0 when no items were seen.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        let total = self.total_items();
        if total == 0 {
            0.0
        } else {
            self.total_success() as f64 / total as f64
        }
    }

    /// Total elapsed wall-clock duration.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// `true` when every processed item succeeded and the run completed.
    /// This is what maps to process exit code 0.
    pub fn is_clean(&self) -> bool {
        self.total_failed() == 0 && !self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(name: &str, total: usize, success: usize, failed: usize) -> CategoryStats {
        CategoryStats {
            name: name.into(),
            total,
            success,
            failed,
            enumeration_error: None,
        }
    }

    #[test]
    fn totals_are_pure_sums() {
        let report = RunReport {
            categories: vec![stats("A", 3, 3, 0), stats("B", 2, 1, 1), stats("C", 0, 0, 0)],
            started_at: Utc::now(),
            finished_at: Utc::now(),
            cancelled: false,
        };
        assert_eq!(report.total_items(), 5);
        assert_eq!(report.total_success(), 3);
        assert_eq!(report.total_failed(), 1);
        assert!((report.success_rate() - 0.6).abs() < f64::EPSILON);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_category_rate_is_undefined() {
        let empty = stats("C", 0, 0, 0);
        assert_eq!(empty.success_rate(), None);
    }

    #[test]
    fn empty_run_rate_is_zero() {
        let report = RunReport {
            categories: vec![stats("A", 0, 0, 0)],
            started_at: Utc::now(),
            finished_at: Utc::now(),
            cancelled: false,
        };
        assert!((report.success_rate() - 0.0).abs() < f64::EPSILON);
        assert!(report.is_clean());
    }
}
