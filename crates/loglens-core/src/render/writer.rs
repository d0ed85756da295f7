use crate::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fully written report content waiting in a temporary file next to its destination
///
/// Dropping a staged report without publishing removes the temporary file and
/// leaves the destination untouched.
pub struct StagedReport {
    file: NamedTempFile,
    destination: PathBuf,
}

impl StagedReport {
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Move the staged file into place without replacing an existing report
    ///
    /// Returns `false` when a report already exists at the destination.
    pub fn publish(self) -> Result<bool> {
        let destination = self.destination;
        match self.file.persist_noclobber(&destination) {
            Ok(_) => {
                tracing::debug!("Published report to {}", destination.display());
                Ok(true)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                tracing::info!(
                    "Report appeared at {} while rendering, keeping it",
                    destination.display()
                );
                Ok(false)
            }
            Err(e) => Err(Error::Publish {
                path: destination,
                source: e.error,
            }),
        }
    }
}

pub struct ReportWriter;

impl ReportWriter {
    /// Write `content` to a temporary file in the destination's directory
    pub fn stage(content: &str, destination: &Path) -> Result<StagedReport> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut file = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;

        tracing::debug!("Staged report in {}", file.path().display());

        Ok(StagedReport {
            file,
            destination: destination.to_path_buf(),
        })
    }

    /// Stage and publish in one step
    pub fn write_atomic(content: &str, destination: &Path) -> Result<bool> {
        Self::stage(content, destination)?.publish()
    }
}
