//! gpf-scan - Gig preflight library scanner
//!
//! Scans a music folder and writes a report of unsupported files,
//! byte-identical duplicates and tracks missing title/artist tags, with
//! optional AcoustID suggestions for the latter.
//!
//! stdout carries exactly one line on success (`Report saved to <path>`);
//! logs go to stderr. Any fatal error exits with status 1.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gpf_common::config::{load_toml_config, TomlConfig};
use gpf_scan::config::ScanConfig;
use gpf_scan::services::{ReportFormat, ReportGenerator, ScanOrchestrator};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for gpf-scan
#[derive(Parser, Debug)]
#[command(name = "gpf-scan")]
#[command(about = "Scan a music library for unsupported files, duplicates and missing tags")]
#[command(version, long_version = long_version())]
struct Args {
    /// Root folder to scan
    #[arg(long)]
    path: PathBuf,

    /// Report output file
    #[arg(long, default_value = "report.html")]
    report: PathBuf,

    /// Fingerprint files missing metadata and look them up on AcoustID
    #[arg(long)]
    fingerprint: bool,

    /// Report format
    #[arg(long, default_value = "html")]
    format: ReportFormat,

    /// TOML config file (default: per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// fpcalc executable
    #[arg(long, env = "GPF_FPCALC")]
    fpcalc: Option<PathBuf>,

    /// Concurrent hashing/metadata tasks (default: available parallelism)
    #[arg(long)]
    jobs: Option<usize>,

    /// Concurrent fingerprint/lookup tasks
    #[arg(long, default_value_t = gpf_scan::config::DEFAULT_LOOKUP_JOBS)]
    lookup_jobs: usize,

    /// Per-file fpcalc timeout in seconds
    #[arg(long)]
    fingerprint_timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// License key passed by the desktop shell
    #[arg(long, hide = true)]
    license: Option<String>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_HASH"),
        ", ",
        env!("BUILD_PROFILE"),
        ")"
    )
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(run(args)) {
        Ok(report_path) => {
            println!("Report saved to {}", report_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<PathBuf> {
    let toml_config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&toml_config, args.verbose);

    info!("Starting gpf-scan {}", long_version());
    if args.license.is_some() {
        debug!("License key supplied (not checked)");
    }

    let config = build_scan_config(&args, &toml_config);
    let report_path = absolute_path(&args.report)?;

    info!(
        root = %config.root.display(),
        report = %report_path.display(),
        fingerprint = config.fingerprint,
        jobs = config.jobs,
        "Scan configured"
    );

    let orchestrator = ScanOrchestrator::new(config).context("Failed to initialize scan")?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let report = orchestrator.run(&cancel).await.context("Scan failed")?;

    ReportGenerator::new(args.format)
        .write(&report, &report_path)
        .context("Failed to write report")?;

    info!(
        unsupported = report.unsupported_count,
        duplicate_sets = report.duplicate_set_count(),
        missing_metadata = report.missing_metadata_count(),
        "Done"
    );

    Ok(report_path)
}

/// CLI flags override TOML values, which override built-in defaults
fn build_scan_config(args: &Args, toml_config: &TomlConfig) -> ScanConfig {
    let mut config = ScanConfig::new(args.path.clone())
        .with_toml(toml_config)
        .with_fingerprint(args.fingerprint)
        .with_lookup_jobs(args.lookup_jobs);

    if let Some(jobs) = args.jobs {
        config = config.with_jobs(jobs);
    }
    if let Some(fpcalc) = &args.fpcalc {
        config.fpcalc_path = fpcalc.clone();
    }
    if let Some(secs) = args.fingerprint_timeout {
        config.fingerprint_timeout = Duration::from_secs(secs.max(1));
    }

    config
}

/// RUST_LOG → `--verbose` → TOML `[logging] level` → info
fn init_tracing(toml_config: &TomlConfig, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        toml_config.logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received Ctrl+C, cancelling scan");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
    }
}
