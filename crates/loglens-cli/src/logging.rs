use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

const TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("loglens=debug,loglens_cli=debug,loglens_core=debug")
    } else {
        EnvFilter::new("loglens=info,loglens_cli=info,loglens_core=info")
    }
}

/// Install the global subscriber, appending to `log_file` when given
pub fn init_logging(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }

    Ok(())
}
