//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats. Logs go to stderr and,
//! unless disabled, to a dated file such as `/tmp/heicwatch_2026-10-18.log`.

use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Path of the log file for `date` inside `dir`.
pub fn log_file_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("heicwatch_{}.log", date.format("%Y-%m-%d")))
}

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - If true, enables DEBUG level logging; otherwise INFO level.
/// * `json_format` - If true, outputs structured JSON logs; otherwise pretty-printed.
/// * `log_file` - Optional file that receives a copy of every log line.
///
/// Returns the log file actually opened, if any.
///
/// # Notes
///
/// - Console output goes to stderr (stdout is reserved for reports)
/// - The RUST_LOG environment variable can override the log level
/// - A log file that cannot be opened is reported and skipped
pub fn init(verbose: bool, json_format: bool, log_file: Option<&Path>) -> Option<PathBuf> {
    // Build the filter, respecting RUST_LOG if set
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    if json_format {
        // JSON format for machine parsing
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        // Pretty format for humans
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .boxed(),
        );
    }

    let mut opened = None;
    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let writer = Mutex::new(file);
                if json_format {
                    layers.push(fmt::layer().json().with_writer(writer).boxed());
                } else {
                    layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
                }
                opened = Some(path.to_path_buf());
            }
            Err(e) => {
                eprintln!(
                    "Warning: Cannot open log file {}: {e}\n  Logging to stderr only.",
                    path.display()
                );
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();

    opened
}

/// Initialize logging with configuration from Config plus CLI overrides.
pub fn init_from_config(
    config: &heicwatch_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
    log_dir_override: Option<&Path>,
    no_log_file: bool,
) -> Option<PathBuf> {
    let verbose =
        verbose_override || config.logging.level == "debug" || config.logging.level == "trace";
    let json_format = json_logs_override || config.logging.format == "json";

    let log_file = if no_log_file || !config.logging.file {
        None
    } else {
        let dir = log_dir_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.log_dir());
        Some(log_file_path(&dir, chrono::Local::now().date_naive()))
    };

    init(verbose, json_format, log_file.as_deref())
}
