// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Aggregate batch statistics. Observability only — never part of the
// compression contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Totals for one batch compression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub asset_count: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    /// Build from `(original, compressed)` size pairs, one per asset.
    pub fn from_sizes(pairs: &[(u64, u64)]) -> Self {
        Self {
            asset_count: pairs.len(),
            original_bytes: pairs.iter().map(|(original, _)| original).sum(),
            compressed_bytes: pairs.iter().map(|(_, compressed)| compressed).sum(),
            completed_at: Utc::now(),
        }
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_bytes.saturating_sub(self.compressed_bytes)
    }

    /// Percentage of the original total that was shaved off. Zero-input
    /// batches report 0.0 rather than dividing by zero.
    pub fn percent_saved(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        self.bytes_saved() as f64 * 100.0 / self.original_bytes as f64
    }
}

impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} assets: {:.2} MB -> {:.2} MB ({:.1}% saved)",
            self.asset_count,
            self.original_bytes as f64 / 1_048_576.0,
            self.compressed_bytes as f64 / 1_048_576.0,
            self.percent_saved()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_add_up() {
        let report = BatchReport::from_sizes(&[(500, 200), (300, 300), (200, 100)]);
        assert_eq!(report.asset_count, 3);
        assert_eq!(report.original_bytes, 1000);
        assert_eq!(report.compressed_bytes, 600);
        assert_eq!(report.bytes_saved(), 400);
        assert!((report.percent_saved() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_is_zero_safe() {
        let report = BatchReport::from_sizes(&[]);
        assert_eq!(report.asset_count, 0);
        assert_eq!(report.percent_saved(), 0.0);
    }

    #[test]
    fn display_is_human_readable() {
        let report = BatchReport::from_sizes(&[(2 * 1_048_576, 1_048_576)]);
        let line = report.to_string();
        assert!(line.contains("1 assets"));
        assert!(line.contains("50.0% saved"));
    }
}
