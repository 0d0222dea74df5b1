//! The `heicwatch batch` command: convert every matching file under a directory.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use heicwatch_core::{BatchReport, Config, ConversionJob, FileDiscovery, TaskGroup};

use super::setup;

/// Arguments for the `batch` command.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory to scan (recursively) for HEIC files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory receiving converted files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Maximum conversions running at once [default: 4]
    #[arg(short, long, visible_alias = "concurrency")]
    pub workers: Option<usize>,

    /// Output format extension: png, jpg or jpeg [default: png]
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Extension of files to convert, case-insensitive [default: heic]
    #[arg(long)]
    pub source_ext: Option<String>,

    /// Print a JSON report of the run to stdout
    #[arg(long)]
    pub report: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl BatchArgs {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(workers) = self.workers {
            config.batch.concurrency = workers;
        }
        setup::apply_conversion_overrides(config, self.ext.as_deref(), self.source_ext.as_deref())
    }
}

/// Execute the batch command.
///
/// Every discovered file is attempted even after failures. The command
/// fails with the first conversion error once all jobs are done.
pub async fn execute(args: BatchArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config)?;

    let input = setup::expand_path(&args.input);
    let output = setup::expand_path(&args.output);
    setup::require_dir(&input, "Input")?;
    setup::require_dir(&output, "Output")?;

    let converter = setup::build_converter(&config)?;

    let discovery = FileDiscovery::new(&config.conversion.source_extension);
    let files = discovery.discover(&input)?;

    if files.is_empty() {
        tracing::warn!(
            "No .{} files found in {:?}",
            config.conversion.source_extension,
            input
        );
        if args.report {
            println!("{}", serde_json::to_string_pretty(&BatchReport::default())?);
        }
        return Ok(());
    }
    tracing::info!("Found {} file(s) to convert", files.len());

    let target_extension = config.conversion.target_extension.clone();
    let jobs: Vec<ConversionJob> = files
        .into_iter()
        .map(|path| ConversionJob::new(path, &output, &target_extension))
        .collect();

    let progress = if args.no_progress {
        ProgressBar::hidden()
    } else {
        create_progress_bar(jobs.len() as u64)
    };
    let start_time = Instant::now();

    let pb = progress.clone();
    let report = TaskGroup::new(config.batch.concurrency)
        .run(jobs, converter, move |_, _| {
            pb.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                pb.set_message(format!("{:.1} img/sec", pb.position() as f64 / elapsed));
            }
        })
        .await;
    progress.finish_and_clear();

    print_summary(&report, start_time.elapsed());

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(err) = report.first_error {
        anyhow::bail!(
            "{} of {} conversion(s) failed; first error: {}",
            report.failed,
            report.total,
            err
        );
    }

    Ok(())
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_summary(report: &BatchReport, elapsed: Duration) {
    let rate = if elapsed.as_secs_f64() > 0.0 {
        report.total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Converted:    {:>8}", report.succeeded);
    if report.failed > 0 {
        eprintln!("    Failed:       {:>8}", report.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
    for failure in report.failures.iter().take(10) {
        eprintln!("    ✗ {}: {}", failure.source_path.display(), failure.error);
    }
    if report.failures.len() > 10 {
        eprintln!("    ... and {} more", report.failures.len() - 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: BatchArgs,
    }

    #[test]
    fn test_default_concurrency_comes_from_config() {
        let cli = TestCli::parse_from(["test", "--input", "in", "--output", "out"]);
        let mut config = Config::default();
        cli.args.apply(&mut config).unwrap();
        assert_eq!(config.batch.concurrency, 4);
        assert!(!cli.args.report);
    }

    #[test]
    fn test_concurrency_alias_overrides_config() {
        let cli = TestCli::parse_from([
            "test",
            "-i",
            "in",
            "-o",
            "out",
            "--concurrency",
            "2",
            "--ext",
            "jpeg",
            "--report",
        ]);
        let mut config = Config::default();
        cli.args.apply(&mut config).unwrap();
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.conversion.target_extension, "jpeg");
        assert!(cli.args.report);
    }

    #[test]
    fn test_invalid_extension_is_rejected() {
        let cli = TestCli::parse_from(["test", "-i", "in", "-o", "out", "--ext", "bmp"]);
        let mut config = Config::default();
        assert!(cli.args.apply(&mut config).is_err());
    }

    #[tokio::test]
    async fn test_missing_output_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = BatchArgs {
            input: dir.path().to_path_buf(),
            output: dir.path().join("missing"),
            workers: None,
            ext: None,
            source_ext: None,
            report: false,
            no_progress: true,
        };
        let err = execute(args, Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("Output directory does not exist"));
    }
}
