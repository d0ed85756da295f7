use super::{Aggregate, Analyzer, RunStats};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Timing summary for a single URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub url: String,
    pub count: usize,
    pub count_perc: f64,
    pub time_sum: f64,
    pub time_perc: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
}

impl ReportRow {
    /// Summarize one URL's durations against the run totals
    ///
    /// `durations` must be non-empty and `stats` must have non-zero
    /// `succeeded_lines` and `total_duration`.
    fn from_durations(url: &str, durations: &[f64], stats: &RunStats) -> Self {
        let count = durations.len();
        let time_sum: f64 = durations.iter().sum();
        let time_max = durations.iter().copied().fold(f64::MIN, f64::max);

        Self {
            url: url.to_string(),
            count,
            count_perc: round3(100.0 * count as f64 / stats.succeeded_lines as f64),
            time_sum: round3(time_sum),
            time_perc: round3(100.0 * time_sum / stats.total_duration),
            time_avg: round3(time_sum / count as f64),
            time_max: round3(time_max),
            time_med: round3(median(durations)),
        }
    }
}

/// Ranked report rows, slowest URLs (by total time) first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compact JSON array of the rows, in rank order
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Turns an aggregate into a report capped at `size` rows
pub struct ReportBuilder {
    size: usize,
}

impl ReportBuilder {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    pub fn build(&self, aggregate: &Aggregate) -> Result<Report> {
        let stats = &aggregate.stats;
        if stats.succeeded_lines == 0 {
            return Err(Error::EmptyAggregate(
                "no successfully parsed lines".to_string(),
            ));
        }
        if stats.total_duration <= 0.0 {
            return Err(Error::EmptyAggregate(
                "total request time is zero".to_string(),
            ));
        }

        let mut rows: Vec<ReportRow> = aggregate
            .url_stats
            .iter()
            .filter(|(_, durations)| !durations.is_empty())
            .map(|(url, durations)| ReportRow::from_durations(url, durations, stats))
            .collect();

        rows.sort_by(|a, b| b.time_sum.total_cmp(&a.time_sum));
        rows.truncate(self.size);

        tracing::debug!(
            "Built report with {} of {} urls",
            rows.len(),
            aggregate.url_stats.len()
        );

        Ok(Report { rows })
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Analyzer for ReportBuilder {
    type Output = Report;

    fn analyze(&self, aggregate: &Aggregate) -> Result<Self::Output> {
        self.build(aggregate)
    }
}

/// Round to 3 decimal places, ties to even on the exact binary value
///
/// Fixed-precision formatting is correctly rounded, which keeps values like
/// `0.0005` (stored slightly above the tie) rounding up while true ties such
/// as `0.0625` go to the even digit.
pub fn round3(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.3}", value).parse().unwrap_or(value)
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
