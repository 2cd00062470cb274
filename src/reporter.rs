//! # Reporter Module
//!
//! Two emission points per run:
//! - **Pre-run total**: every discovered file, emitted after enumeration and
//!   before the queue is released.
//! - **Final total**: emitted once after the queue drains. Sums cover only the
//!   files that succeeded; failed files still count in the total, including
//!   those whose size could not be read and so never reached the ledger.

use crate::file_manager::FileManager;
use crate::ledger::SizeLedger;
use serde::Serialize;
use tracing::info;

/// Aggregate result of a run, computed from the ledger after the drain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub total: usize,
    pub total_before_size: u64,
    pub total_after_size: u64,
}

impl RunSummary {
    /// `unrecorded` counts matched files that failed before entering the ledger
    pub fn from_ledger(ledger: &SizeLedger, unrecorded: usize) -> Self {
        let (succeeded, total_before_size, total_after_size) = ledger
            .snapshot()
            .iter()
            .filter_map(|(_, record)| record.after_size.map(|after| (record.before_size, after)))
            .fold((0, 0u64, 0u64), |(count, before, after), (b, a)| {
                (count + 1, before + b, after + a)
            });

        Self {
            succeeded,
            total: ledger.len() + unrecorded,
            total_before_size,
            total_after_size,
        }
    }

    /// Bytes saved over the succeeded files, negative if they grew
    pub fn bytes_saved(&self) -> i64 {
        self.total_before_size as i64 - self.total_after_size as i64
    }

    pub fn percent_saved(&self) -> f64 {
        FileManager::calculate_reduction(self.total_before_size, self.total_after_size)
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Total optimized ({} / {}) [{}]",
            self.succeeded,
            self.total,
            display_size(self.total_before_size, self.total_after_size)
        )
    }
}

/// `before -> after / -saved -pct%`
pub fn display_size(before: u64, after: u64) -> String {
    let sign = if after > before { '+' } else { '-' };
    format!(
        "{} -> {} / {}{} {}{:.1}%",
        FileManager::format_size(before),
        FileManager::format_size(after),
        sign,
        FileManager::format_size(before.abs_diff(after)),
        sign,
        FileManager::calculate_reduction(before, after).abs()
    )
}

pub fn format_pre_run(ledger: &SizeLedger) -> String {
    format!(
        "Total before optimized ({}) [{}]",
        ledger.len(),
        FileManager::format_size(ledger.total_before())
    )
}

/// Emit the pre-run total
pub fn report_pre_run(ledger: &SizeLedger) {
    info!("{}", format_pre_run(ledger));
}

/// Emit the final total
pub fn report_final(summary: &RunSummary) {
    info!("{}", summary.format_summary());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn scenario_ledger() -> SizeLedger {
        let mut ledger = SizeLedger::new();
        ledger.record(PathBuf::from("a.png"), 100_000).unwrap();
        ledger.record(PathBuf::from("b.png"), 200_000).unwrap();
        ledger.complete(Path::new("a.png"), 60_000).unwrap();
        ledger
    }

    #[test]
    fn test_summary_excludes_failed_from_sums() {
        let summary = RunSummary::from_ledger(&scenario_ledger(), 0);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.total_before_size, 100_000);
        assert_eq!(summary.total_after_size, 60_000);
        assert_eq!(summary.bytes_saved(), 40_000);
        assert_eq!(format!("{:.1}", summary.percent_saved()), "40.0");
    }

    #[test]
    fn test_summary_line() {
        let summary = RunSummary::from_ledger(&scenario_ledger(), 0);
        assert_eq!(
            summary.format_summary(),
            "Total optimized (1 / 2) [97.66 KB -> 58.59 KB / -39.06 KB -40.0%]"
        );
    }

    #[test]
    fn test_unrecorded_failures_count_in_total() {
        let summary = RunSummary::from_ledger(&scenario_ledger(), 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.total_before_size, 100_000);
        assert!(summary.format_summary().starts_with("Total optimized (1 / 3) "));
    }

    #[test]
    fn test_pre_run_line_counts_everything() {
        let ledger = scenario_ledger();
        assert_eq!(format_pre_run(&ledger), "Total before optimized (2) [292.97 KB]");
    }

    #[test]
    fn test_empty_run() {
        let ledger = SizeLedger::new();
        let summary = RunSummary::from_ledger(&ledger, 0);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percent_saved(), 0.0);
        assert_eq!(format_pre_run(&ledger), "Total before optimized (0) [0 B]");
        assert_eq!(
            summary.format_summary(),
            "Total optimized (0 / 0) [0 B -> 0 B / -0 B -0.0%]"
        );
    }

    #[test]
    fn test_display_size_growth() {
        assert_eq!(display_size(100, 120), "100 B -> 120 B / +20 B +20.0%");
    }
}
