use super::{Aggregate, Analyzer, LogSummary};
use crate::Result;

pub struct SummaryAnalyzer;

impl Analyzer for SummaryAnalyzer {
    type Output = LogSummary;

    fn analyze(&self, aggregate: &Aggregate) -> Result<Self::Output> {
        let stats = &aggregate.stats;

        tracing::debug!(
            "Summary analysis complete: {} lines, {} urls",
            stats.total_lines,
            aggregate.url_stats.len()
        );

        Ok(LogSummary {
            total_lines: stats.total_lines,
            succeeded_lines: stats.succeeded_lines,
            failed_lines: stats.failed_lines(),
            error_fraction: stats.error_fraction(),
            total_duration: stats.total_duration,
            distinct_urls: aggregate.url_stats.len(),
        })
    }
}
