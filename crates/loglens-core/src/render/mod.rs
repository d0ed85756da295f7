mod writer;

pub use writer::{ReportWriter, StagedReport};

use crate::analysis::Report;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Token in the HTML template replaced by the report JSON
pub const PLACEHOLDER: &str = "$table_json";

/// `report-YYYY.MM.DD.html` for the given log date
pub fn report_file_name(date: NaiveDate) -> String {
    format!("report-{}.html", date.format("%Y.%m.%d"))
}

/// Full path of the report for `date` under `report_dir`
pub fn report_path(report_dir: &Path, date: NaiveDate) -> PathBuf {
    report_dir.join(report_file_name(date))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Written(PathBuf),
    /// A report for this destination already existed
    Skipped(PathBuf),
}

/// Injects report JSON into an HTML template
pub struct ReportRenderer {
    template: String,
}

impl ReportRenderer {
    /// Load the template from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading report template from: {}", path.display());
        let template = fs::read_to_string(path)?;
        Self::from_template(template)
    }

    pub fn from_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(PLACEHOLDER) {
            return Err(Error::Template(format!(
                "template has no '{}' placeholder",
                PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// Template text with the placeholder replaced by the report JSON
    ///
    /// `</` is written as `<\/` so a URL cannot close the surrounding
    /// `<script>` element; the payload stays valid JSON.
    pub fn fill(&self, report: &Report) -> Result<String> {
        let json = report.to_json()?.replace("</", "<\\/");
        Ok(self.template.replace(PLACEHOLDER, &json))
    }

    /// Render `report` to `destination` unless a report is already there
    pub fn render(&self, report: &Report, destination: &Path) -> Result<RenderOutcome> {
        if destination.exists() {
            tracing::info!(
                "Report {} already exists, nothing to do",
                destination.display()
            );
            return Ok(RenderOutcome::Skipped(destination.to_path_buf()));
        }

        let html = self.fill(report)?;
        let published = ReportWriter::write_atomic(&html, destination)?;

        if published {
            tracing::info!(
                "Report with {} rows saved into {}",
                report.len(),
                destination.display()
            );
            Ok(RenderOutcome::Written(destination.to_path_buf()))
        } else {
            Ok(RenderOutcome::Skipped(destination.to_path_buf()))
        }
    }
}
