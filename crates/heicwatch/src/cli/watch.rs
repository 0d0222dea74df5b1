//! The `heicwatch watch` command: convert files as they appear.

use clap::Args;
use std::path::PathBuf;

use heicwatch_core::{
    shutdown_channel, Config, EventFilter, PoolStats, WatchSource, WorkerPool, WorkerPoolConfig,
};

use super::setup;

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Directory to watch for new HEIC files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory receiving converted files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of conversion workers [default: 8]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output format extension: png, jpg or jpeg [default: png]
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Extension of files to convert, case-insensitive [default: heic]
    #[arg(long)]
    pub source_ext: Option<String>,

    /// Capacity of the event queue between watcher and workers [default: 1024]
    #[arg(long)]
    pub buffer: Option<usize>,

    /// Also watch subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

impl WatchArgs {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(workers) = self.workers {
            config.watch.workers = workers;
        }
        if let Some(buffer) = self.buffer {
            config.watch.buffer_size = buffer;
        }
        if self.recursive {
            config.watch.recursive = true;
        }
        setup::apply_conversion_overrides(config, self.ext.as_deref(), self.source_ext.as_deref())
    }
}

/// Execute the watch command. Runs until interrupted or the watcher stops.
pub async fn execute(args: WatchArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config)?;

    let input = setup::expand_path(&args.input);
    let output = setup::expand_path(&args.output);
    setup::require_dir(&input, "Input")?;
    setup::require_dir(&output, "Output")?;

    let converter = setup::build_converter(&config)?;
    let pool_config = WorkerPoolConfig::new(
        config.watch.workers,
        &output,
        &config.conversion.target_extension,
    )?;
    let filter = EventFilter::new(&config.conversion.source_extension);

    let source = WatchSource::start(&input, &config.watch)?;
    let (trigger, signal) = shutdown_channel();
    let span = tracing::info_span!("watch", input = %input.display());

    let pool = WorkerPool::spawn(
        &pool_config,
        filter,
        converter,
        source.events(),
        source.errors(),
        signal,
        &span,
    )?;

    span.in_scope(|| {
        tracing::info!(
            workers = pool.len(),
            output = %output.display(),
            source_ext = %config.conversion.source_extension,
            target_ext = %config.conversion.target_extension,
            "converter running; press Ctrl-C to stop"
        )
    });

    let mut join = tokio::task::spawn_blocking(move || pool.join());

    let stats = tokio::select! {
        joined = &mut join => {
            tracing::warn!("watch event stream closed");
            joined?
        }
        interrupted = tokio::signal::ctrl_c() => {
            match interrupted {
                Ok(()) => {
                    tracing::info!("interrupt received, waiting for in-flight conversions");
                    trigger.fire();
                }
                Err(e) => {
                    tracing::error!("cannot listen for interrupt signal: {e}");
                }
            }
            join.await?
        }
    };

    // Workers are gone; stop watching only now so no event is cut off mid-send.
    drop(source);

    log_stats(&stats);
    Ok(())
}

fn log_stats(stats: &PoolStats) {
    tracing::info!(
        converted = stats.converted,
        failed = stats.failed,
        ignored = stats.ignored,
        panicked = stats.panicked,
        "watch stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: WatchArgs,
    }

    #[test]
    fn test_flags_leave_config_defaults_when_absent() {
        let cli = TestCli::parse_from(["test", "--input", "in", "--output", "out"]);
        let mut config = Config::default();
        cli.args.apply(&mut config).unwrap();
        assert_eq!(config.watch.workers, 8);
        assert_eq!(config.watch.buffer_size, 1024);
        assert_eq!(config.conversion.target_extension, "png");
        assert!(!config.watch.recursive);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = TestCli::parse_from([
            "test", "-i", "in", "-o", "out", "-w", "3", "-e", "jpg", "--buffer", "16", "-r",
        ]);
        let mut config = Config::default();
        cli.args.apply(&mut config).unwrap();
        assert_eq!(config.watch.workers, 3);
        assert_eq!(config.watch.buffer_size, 16);
        assert_eq!(config.conversion.target_extension, "jpg");
        assert!(config.watch.recursive);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let cli = TestCli::parse_from(["test", "-i", "in", "-o", "out", "--workers", "0"]);
        let mut config = Config::default();
        assert!(cli.args.apply(&mut config).is_err());
    }

    #[tokio::test]
    async fn test_missing_input_dir_fails_before_watching() {
        let dir = tempfile::tempdir().unwrap();
        let args = WatchArgs {
            input: dir.path().join("missing"),
            output: dir.path().to_path_buf(),
            workers: None,
            ext: None,
            source_ext: None,
            buffer: None,
            recursive: false,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("Input directory does not exist"));
    }
}
