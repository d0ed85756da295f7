use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use loglens_cli::{OutputFormat, commands, logging};
use loglens_core::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "A CLI tool for turning nginx access logs into per-URL timing reports",
    long_about = "Loglens finds the newest nginx access log in a directory, aggregates request \
                  times per URL and publishes a ranked HTML report. Runs are idempotent: a date \
                  that already has a report is skipped."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON config file overriding the default settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the HTML report for the newest log file (default)
    Report,

    /// Print statistics for a single log file without writing a report
    Stats {
        /// Path to the log file (plain or .gz)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of slowest URLs to show
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts for loglens.\n\n\
        SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: loglens completion --shell bash >> ~/.bashrc\n  \
        zsh:  loglens completion --shell zsh > \"${fpath[1]}/_loglens\"\n  \
        fish: loglens completion --shell fish > ~/.config/fish/completions/loglens.fish")]
    Completion {
        /// Shell to generate the script for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Report);

    if let Commands::Completion { shell } = command {
        return match commands::completion::execute(shell, &mut Cli::command()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error while reading configuration file: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logging(config.log_file(), cli.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match command {
        Commands::Report => commands::report::execute(&config),
        Commands::Stats { file, top, format } => {
            commands::stats::execute(&file, config.error_rate, top, format)
        }
        Commands::Completion { .. } => Ok(ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Unhandled error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::default()),
    }
}
