use anyhow::{Context, Result};
use loglens_core::Config;
use loglens_core::analysis::{LogParser, ParseOutcome, ReportBuilder};
use loglens_core::log::LogLocator;
use loglens_core::render::{RenderOutcome, ReportRenderer, report_path};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status for a parse rejected by the error rate threshold
pub const REJECTED_EXIT_CODE: u8 = 2;

/// How a report run ended, short of a fault
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Published(PathBuf),
    NoLogFound,
    AlreadyReported(PathBuf),
    Rejected { error_fraction: f64 },
}

impl Outcome {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Outcome::Rejected { .. } => ExitCode::from(REJECTED_EXIT_CODE),
            _ => ExitCode::SUCCESS,
        }
    }
}

/// Locate the newest log, parse it and publish its HTML report
pub fn run_report(config: &Config) -> Result<Outcome> {
    let Some(log) = LogLocator::default()
        .find_latest(&config.log_dir)
        .with_context(|| format!("Failed to scan log directory {}", config.log_dir.display()))?
    else {
        return Ok(Outcome::NoLogFound);
    };

    let destination = report_path(&config.report_dir, log.date);
    if destination.exists() {
        return Ok(Outcome::AlreadyReported(destination));
    }

    let renderer = ReportRenderer::from_file(&config.report_template).with_context(|| {
        format!(
            "Failed to load report template {}",
            config.report_template.display()
        )
    })?;

    let outcome = LogParser::new(config.error_rate)
        .parse(&log.path)
        .with_context(|| format!("Failed to read log file {}", log.path.display()))?;

    let aggregate = match outcome {
        ParseOutcome::Accepted(aggregate) => aggregate,
        ParseOutcome::Rejected { error_fraction, .. } => {
            return Ok(Outcome::Rejected { error_fraction });
        }
    };

    let report = ReportBuilder::new(config.report_size)
        .build(&aggregate)
        .with_context(|| format!("Failed to build report for {}", log.path.display()))?;

    let rendered = renderer
        .render(&report, &destination)
        .with_context(|| format!("Failed to write report {}", destination.display()))?;

    Ok(match rendered {
        RenderOutcome::Written(path) => Outcome::Published(path),
        RenderOutcome::Skipped(path) => Outcome::AlreadyReported(path),
    })
}

pub fn execute(config: &Config) -> Result<ExitCode> {
    tracing::debug!("Running report with config: {:?}", config);

    let outcome = run_report(config)?;
    match &outcome {
        Outcome::Published(path) => {
            tracing::info!("All operations completed. Report saved into {}", path.display())
        }
        Outcome::NoLogFound => tracing::info!("Log file not found. Nothing to parse"),
        Outcome::AlreadyReported(path) => {
            tracing::info!("Report {} already exists. Nothing to do", path.display())
        }
        Outcome::Rejected { error_fraction } => tracing::error!(
            "{:.3}% of lines failed to parse, above the {:.3}% limit. Abort",
            error_fraction * 100.0,
            config.error_rate * 100.0
        ),
    }

    Ok(outcome.exit_code())
}
