use crate::OutputFormat;
use anyhow::{Context, Result};
use loglens_core::analysis::{
    Aggregate, Analyzer, LogParser, LogSummary, ParseOutcome, ReportBuilder, ReportRow,
    SummaryAnalyzer,
};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::report::REJECTED_EXIT_CODE;

/// Console statistics for a single log file
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub file_name: String,
    pub summary: LogSummary,
    /// Whether the error fraction is above the configured threshold
    pub rejected: bool,
    pub top_urls: Vec<ReportRow>,
}

/// Parse `file` and summarize it; the threshold only flags the result
pub fn analyze_log(file: &Path, error_rate: f64, top: usize) -> Result<LogStats> {
    let aggregate = match LogParser::new(1.0)
        .parse(file)
        .with_context(|| format!("Failed to read log file {}", file.display()))?
    {
        ParseOutcome::Accepted(aggregate) => aggregate,
        ParseOutcome::Rejected { stats, .. } => Aggregate {
            stats,
            ..Aggregate::default()
        },
    };

    let summary = SummaryAnalyzer.analyze(&aggregate)?;
    let rejected = summary.error_fraction > error_rate;

    let top_urls = if rejected || summary.succeeded_lines == 0 || summary.total_duration <= 0.0 {
        Vec::new()
    } else {
        ReportBuilder::new(top).analyze(&aggregate)?.rows
    };

    Ok(LogStats {
        file_name: file
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string()),
        summary,
        rejected,
        top_urls,
    })
}

pub fn execute(file: &Path, error_rate: f64, top: usize, format: OutputFormat) -> Result<ExitCode> {
    tracing::info!("Extracting statistics from log file: {}", file.display());

    let stats = analyze_log(file, error_rate, top)?;

    match format {
        OutputFormat::Json => output_json(&stats)?,
        OutputFormat::Table => output_table(&stats),
        OutputFormat::Pretty => output_pretty(&stats, error_rate),
    }

    if stats.rejected {
        Ok(ExitCode::from(REJECTED_EXIT_CODE))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn output_pretty(stats: &LogStats, error_rate: f64) {
    use console::style;

    println!("\n{}", style("Access Log Statistics").bold().cyan());
    println!("{}", style("=====================").cyan());

    let summary = &stats.summary;
    println!("\n{}", style("Summary:").bold());
    println!("  File:               {}", stats.file_name);
    println!("  Total Lines:        {}", summary.total_lines);
    println!("  Parsed Lines:       {}", summary.succeeded_lines);
    println!("  Failed Lines:       {}", summary.failed_lines);
    println!("  Error Rate:         {:.3}%", summary.error_fraction * 100.0);
    println!("  Total Request Time: {:.3} s", summary.total_duration);
    println!("  Distinct URLs:      {}", summary.distinct_urls);

    if stats.rejected {
        println!(
            "\n{} error rate is above the {:.3}% limit, no report would be built",
            style("Rejected:").bold().red(),
            error_rate * 100.0
        );
    }

    if !stats.top_urls.is_empty() {
        println!("\n{}", style("Slowest URLs (by total time):").bold());
        for (i, row) in stats.top_urls.iter().enumerate() {
            println!(
                "  {}. [{:.3} s, {:.3}%] {} requests, avg {:.3} s, med {:.3} s, max {:.3} s - {}",
                i + 1,
                row.time_sum,
                row.time_perc,
                row.count,
                row.time_avg,
                row.time_med,
                row.time_max,
                row.url
            );
        }
    }

    println!();
}

fn output_json(stats: &LogStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    println!("{}", json);
    Ok(())
}

fn output_table(stats: &LogStats) {
    let summary = &stats.summary;
    println!("Metric,Value");
    println!("Total Lines,{}", summary.total_lines);
    println!("Parsed Lines,{}", summary.succeeded_lines);
    println!("Failed Lines,{}", summary.failed_lines);
    println!("Error Rate (%),{:.3}", summary.error_fraction * 100.0);
    println!("Total Request Time (s),{:.3}", summary.total_duration);
    println!("Distinct URLs,{}", summary.distinct_urls);

    if !stats.top_urls.is_empty() {
        println!();
        println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
        for row in &stats.top_urls {
            println!(
                "{},{},{},{},{},{},{},{}",
                row.url,
                row.count,
                row.count_perc,
                row.time_sum,
                row.time_perc,
                row.time_avg,
                row.time_max,
                row.time_med
            );
        }
    }
}
