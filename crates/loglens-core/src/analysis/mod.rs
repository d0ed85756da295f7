mod aggregator;
mod report;
mod summary;

pub use aggregator::{Aggregator, LogParser, PROGRESS_INTERVAL};
pub use report::{Report, ReportBuilder, ReportRow, round3};
pub use summary::SummaryAnalyzer;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Observed request durations per URL, in encounter order
pub type UrlStats = HashMap<String, Vec<f64>>;

/// Line accounting for a single parsing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub total_lines: u64,
    pub succeeded_lines: u64,
    pub total_duration: f64,
}

impl RunStats {
    /// Fraction of lines that failed to parse; zero for an empty file
    pub fn error_fraction(&self) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        1.0 - self.succeeded_lines as f64 / self.total_lines as f64
    }

    pub fn failed_lines(&self) -> u64 {
        self.total_lines - self.succeeded_lines
    }
}

/// Per-URL durations plus the run totals they were collected with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub url_stats: UrlStats,
    pub stats: RunStats,
}

/// Result of parsing one log file against the error rate threshold
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Accepted(Aggregate),
    /// Too many lines failed to parse; no report may be built
    Rejected { stats: RunStats, error_fraction: f64 },
}

/// Run-level overview of a parsed log, used for console output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total_lines: u64,
    pub succeeded_lines: u64,
    pub failed_lines: u64,
    pub error_fraction: f64,
    pub total_duration: f64,
    pub distinct_urls: usize,
}

pub trait Analyzer {
    type Output;

    fn analyze(&self, aggregate: &Aggregate) -> crate::Result<Self::Output>;
}
