mod constants;
mod disk;
mod error;
mod model;
mod orchestrator;
mod prompt;
mod report;
mod targets;
mod user;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use disk::DiskUsageMonitor;
use indicatif::{ProgressBar, ProgressStyle};
use model::{RunMode, TargetKind};
use orchestrator::{CleanupOptions, CleanupOrchestrator, Evaluation};
use report::ReportFormatter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use user::UserContext;

#[derive(Parser)]
#[command(
    version,
    about = "Frees disk space by clearing Trash, browser caches and APT caches when free space runs low.",
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Free space percentage below which cleanup is triggered
    #[arg(
        long,
        env = "RECLAIMER_THRESHOLD",
        default_value_t = constants::DEFAULT_THRESHOLD_PERCENT,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    threshold: u8,

    /// Run cleanup regardless of free space
    #[arg(short, long)]
    force: bool,

    /// Show what would be freed without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Any path on the filesystem to measure
    #[arg(long, env = "RECLAIMER_PATH", default_value = constants::DEFAULT_MEASURED_PATH)]
    path: PathBuf,

    /// Leave `apt-get autoremove` / `apt-get clean` out of the run
    #[arg(long)]
    skip_packages: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log debug details to stderr
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner updates per target. External commands inherit the terminal, so
/// the spinner is cleared for good before the first one starts.
fn report_progress(pb: &ProgressBar) -> impl Fn(&str, TargetKind) + '_ {
    move |id, kind| {
        if kind == TargetKind::ExternalCommand {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
            eprintln!("Running {id}...");
        } else {
            pb.set_message(format!("Processing {id}..."));
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user = UserContext::from_env()?;
    if !user.elevated {
        if cli.dry_run {
            warn!("running dry-run without root; some files may not be readable");
        } else {
            eprintln!("Error: this tool must be run as root (use sudo).");
            return Ok(ExitCode::FAILURE);
        }
    }
    info!(
        user = user.name.as_deref().unwrap_or("?"),
        home = %user.home.display(),
        "resolved target user"
    );

    let color = !cli.no_color && io::stdout().is_tty();
    let mode = if cli.dry_run {
        RunMode::Simulate
    } else {
        RunMode::Real
    };
    let options = CleanupOptions {
        threshold_percent: f64::from(cli.threshold),
        force: cli.force,
        mode,
        auto_confirm: cli.yes,
    };

    let targets = targets::standard_targets(&user.home, &cli.path, !cli.skip_packages);
    let orchestrator = CleanupOrchestrator::new(DiskUsageMonitor, cli.path.clone(), targets, options);
    let formatter = ReportFormatter {
        color,
        mount: disk::mount_point_for(&cli.path),
    };

    let evaluation = orchestrator
        .evaluate()
        .with_context(|| format!("cannot evaluate disk usage of {}", cli.path.display()))?;

    let run = match evaluation {
        Evaluation::Skip(run) => run,
        Evaluation::Proceed(pending) => {
            let confirmed = if orchestrator.requires_confirmation() {
                prompt::confirm(
                    &orchestrator.planned_actions(),
                    orchestrator.options().mode == RunMode::Simulate,
                    color,
                )
            } else {
                true
            };

            let pb = spinner();
            let progress = report_progress(&pb);
            let run = orchestrator.execute(pending, confirmed, Some(&progress));
            pb.finish_and_clear();
            run
        }
    };

    print!("{}", formatter.render(&run));
    Ok(ExitCode::SUCCESS)
}
