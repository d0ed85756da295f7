use crate::{Error, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref NGINX_LOG_NAME: Regex =
        Regex::new(r"^.*nginx-access-ui\.log-(?P<date>\d{8})(\.gz)?$").unwrap();
}

/// A located log file together with the date embedded in its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileReference {
    pub path: PathBuf,
    pub date: NaiveDate,
}

/// Finds the most recent log file in a directory by the date in its file name
#[derive(Debug, Clone)]
pub struct LogLocator {
    pattern: Regex,
}

impl LogLocator {
    /// Create a locator from a file name pattern
    ///
    /// The pattern must contain a capture group named `date` holding an
    /// 8-digit `YYYYMMDD` date.
    pub fn new(pattern: Regex) -> Result<Self> {
        if !pattern.capture_names().flatten().any(|name| name == "date") {
            return Err(Error::InvalidPattern(format!(
                "File name pattern '{}' has no 'date' capture group",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }

    /// Return the matching file with the greatest embedded date
    ///
    /// `Ok(None)` means no entry in `dir` matched the pattern.
    pub fn find_latest(&self, dir: &Path) -> Result<Option<LogFileReference>> {
        tracing::debug!("Looking for log files in: {}", dir.display());

        let mut latest: Option<LogFileReference> = None;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(date) = self.embedded_date(name) else {
                continue;
            };

            if latest.as_ref().is_none_or(|current| date > current.date) {
                latest = Some(LogFileReference { path, date });
            }
        }

        match &latest {
            Some(found) => tracing::info!("Latest log file: {}", found.path.display()),
            None => tracing::debug!("No log files matched in {}", dir.display()),
        }

        Ok(latest)
    }

    fn embedded_date(&self, name: &str) -> Option<NaiveDate> {
        let captures = self.pattern.captures(name)?;
        let raw = captures.name("date")?.as_str();
        match NaiveDate::parse_from_str(raw, "%Y%m%d") {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!("Ignoring {}: invalid date '{}': {}", name, raw, e);
                None
            }
        }
    }
}

impl Default for LogLocator {
    /// Locator for `nginx-access-ui.log-YYYYMMDD[.gz]` files
    fn default() -> Self {
        Self {
            pattern: NGINX_LOG_NAME.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::is_gzip;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, names: &[&str]) {
        for name in names {
            fs::File::create(dir.path().join(name)).unwrap();
        }
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y%m%d").unwrap()
    }

    #[test]
    fn test_picks_latest_plain_file() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            &[
                "nginx-access-ui.log-20101010",
                "nginx-access-ui.log-20101015",
                "nginx-access-ui.log-20101016",
                "nginx-access-ui.log-20101009.gz",
                "nginx-access-ui.log-20101011.gz",
                "nginx-access-ui.log-20101012.gz",
                "nginx-access-ui.log-20101018.7z",
                "nginx-access-ui.log-20101016.zip",
                "nginx-access-ui.log-20101017.rar",
            ],
        );

        let found = LogLocator::default()
            .find_latest(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.path, dir.path().join("nginx-access-ui.log-20101016"));
        assert_eq!(found.date, date("20101016"));
        assert!(!is_gzip(&found.path));
    }

    #[test]
    fn test_picks_latest_gz_file() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            &[
                "nginx-access-ui.log-20101016",
                "nginx-access-ui.log-20101017.gz",
                "nginx-access-ui.log-20101018.bz2",
            ],
        );

        let found = LogLocator::default()
            .find_latest(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(
            found.path,
            dir.path().join("nginx-access-ui.log-20101017.gz")
        );
        assert_eq!(found.date, date("20101017"));
        assert!(is_gzip(&found.path));
    }

    #[test]
    fn test_empty_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = LogLocator::default().find_latest(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_no_matching_files_is_not_found() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            &["nginx-access-ui.log-2010101", "access.log-20101010", "notes.txt"],
        );

        let result = LogLocator::default().find_latest(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_calendar_date_is_ignored() {
        let dir = TempDir::new().unwrap();
        touch(
            &dir,
            &["nginx-access-ui.log-20101399", "nginx-access-ui.log-20100101"],
        );

        let found = LogLocator::default()
            .find_latest(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.date, date("20100101"));
    }

    #[test]
    fn test_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nginx-access-ui.log-20991231")).unwrap();
        touch(&dir, &["nginx-access-ui.log-20100101"]);

        let found = LogLocator::default()
            .find_latest(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.date, date("20100101"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::os::unix::fs::symlink(
            target.path(),
            dir.path().join("nginx-access-ui.log-20991231"),
        )
        .unwrap();
        touch(&dir, &["nginx-access-ui.log-20100101"]);

        let found = LogLocator::default()
            .find_latest(dir.path())
            .unwrap()
            .unwrap();
        assert_eq!(found.date, date("20100101"));
    }

    #[test]
    fn test_custom_pattern_requires_date_group() {
        let pattern = Regex::new(r"^app\.log-(\d{8})$").unwrap();
        assert!(matches!(
            LogLocator::new(pattern),
            Err(Error::InvalidPattern(_))
        ));

        let pattern = Regex::new(r"^app\.log-(?P<date>\d{8})$").unwrap();
        assert!(LogLocator::new(pattern).is_ok());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let result = LogLocator::default().find_latest(Path::new("/nonexistent/loglens/logs"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
