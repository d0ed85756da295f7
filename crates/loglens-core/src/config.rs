use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Runtime configuration for one analyzer run
///
/// Keys use the upper-case names from the JSON config file. Keys missing from
/// the file keep their defaults; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    /// Maximum number of rows kept in the rendered report
    pub report_size: usize,
    /// Directory the HTML reports are written to
    pub report_dir: PathBuf,
    /// Directory scanned for nginx access logs
    pub log_dir: PathBuf,
    /// Highest tolerated fraction of unparseable lines
    pub error_rate: f64,
    /// Diagnostics destination; `None` or an empty path means stderr
    pub log_name: Option<PathBuf>,
    /// HTML template containing the `$table_json` placeholder
    pub report_template: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            error_rate: 0.1,
            log_name: Some(PathBuf::from("log_analyzer.log")),
            report_template: PathBuf::from("./templates/report.html"),
        }
    }
}

impl Config {
    /// Load a JSON config file and overlay it on the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading config file from: {}", path.display());

        let file = File::open(path)?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a JSON config from a string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(Error::InvalidConfig(format!(
                "ERROR_RATE must be within [0, 1], got {}",
                self.error_rate
            )));
        }
        Ok(())
    }

    /// File to append diagnostics to, if any
    pub fn log_file(&self) -> Option<&Path> {
        self.log_name
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}
