//! cxms-report - anonymous usage telemetry for CxMS projects
//!
//! Run from a project root containing `CLAUDE.md`. The reporter scans the
//! CxMS files, shows a summary, and only sends the record after consent.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/cxms-report/config.toml (~/.config/cxms-report/config.toml)
//! - Logs: $XDG_STATE_HOME/cxms-report/cxms-report.YYYY-MM-DD.log (only with --verbose)

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cxms_report_core::prompt::Terminal;
use cxms_report_core::submit::SyncSubmitter;
use cxms_report_core::{Config, RunOptions, Workflow};

#[derive(Parser)]
#[command(name = "cxms-report")]
#[command(about = "Share anonymous CxMS usage metrics (opt-in)")]
#[command(version)]
struct Args {
    /// Show what would be sent without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Ask the extended feedback survey
    #[arg(long)]
    full: bool,

    /// Skip all survey questions (requires --dry-run or --yes)
    #[arg(long)]
    skip_prompts: bool,

    /// Send without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Write a debug log to the state directory
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            full_survey: self.full,
            skip_prompts: self.skip_prompts,
            auto_consent: self.yes,
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // stdout is the interactive channel, so logging only goes to file
    let _log_guard = if args.verbose {
        Some(
            cxms_report_core::logging::init(&config.logging)
                .context("failed to initialize logging")?,
        )
    } else {
        None
    };

    tracing::info!(
        dry_run = args.dry_run,
        full = args.full,
        skip_prompts = args.skip_prompts,
        yes = args.yes,
        "cxms-report starting"
    );

    let project_dir = std::env::current_dir().context("failed to resolve current directory")?;
    let mut submitter =
        SyncSubmitter::new(&config.endpoint).context("failed to create submitter")?;
    let mut terminal = Terminal::stdio();

    let outcome = Workflow::new(&project_dir, args.run_options())
        .run(&mut terminal, &mut submitter)
        .context("report failed")?;

    tracing::info!(?outcome, "cxms-report finished");

    Ok(ExitCode::from(outcome.exit_code()))
}
