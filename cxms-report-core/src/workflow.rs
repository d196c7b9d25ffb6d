//! One reporting run, start to finish
//!
//! ```text
//! SCAN ──▶ EXTRACT ──▶ [FEEDBACK] ──▶ PREVIEW ──┬──▶ dry run: print JSON, stop
//!  │                                            ├──▶ skip-prompts, no consent: stop
//!  └─ no CLAUDE.md: stop                        └──▶ CONSENT ──▶ SUBMIT | decline
//! ```
//!
//! The identity files are only touched once the manifest has been found.
//! Neither the installation id nor the counter is rolled back when the user
//! declines or the submission fails.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::aggregate::{Aggregator, CLIENT_VERSION};
use crate::artifacts::{self, ArtifactKind};
use crate::error::{Error, Result};
use crate::feedback::{FeedbackCollector, SurveyMode};
use crate::identity::IdentityStore;
use crate::preview;
use crate::prompt::Prompter;
use crate::submit::Submit;
use crate::types::{MetricsRecord, Timing};

const BANNER: &str = "════════════════════════════════════════════════════════════";

const ISSUES_URL: &str = "https://github.com/RobSB2/CxMS/issues";

const STATS_URL: &str = "https://github.com/RobSB2/CxMS";

/// Flags controlling one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Print the record instead of sending it
    pub dry_run: bool,
    /// Ask the extended survey
    pub full_survey: bool,
    /// Ask no survey questions
    pub skip_prompts: bool,
    /// Consent without asking
    pub auto_consent: bool,
}

impl RunOptions {
    fn asks_feedback(&self) -> bool {
        !self.skip_prompts && !self.auto_consent
    }

    fn survey_mode(&self) -> SurveyMode {
        if self.full_survey {
            SurveyMode::Full
        } else {
            SurveyMode::Basic
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No `CLAUDE.md` in the project directory
    MissingManifest,
    /// Record printed, nothing sent
    DryRun,
    /// `--skip-prompts` without `--yes`; nothing sent
    ConsentRequired,
    /// User answered anything but `y`
    Declined,
    Submitted,
    /// The endpoint or transport failed; carries the reason
    SubmitFailed(String),
}

impl Outcome {
    /// Only a missing manifest counts as a failed run.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::MissingManifest)
    }

    /// Process exit status: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Runs the reporter against one project directory.
pub struct Workflow {
    project_dir: PathBuf,
    options: RunOptions,
    aggregator: Aggregator,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Workflow {
    pub fn new(project_dir: &Path, options: RunOptions) -> Self {
        let started_at = Utc::now();
        Self::with_aggregator(project_dir, options, Aggregator::new(started_at))
    }

    /// Use a preconfigured aggregator (fixed clock or host)
    pub fn with_aggregator(project_dir: &Path, options: RunOptions, aggregator: Aggregator) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            options,
            started_at: aggregator.now(),
            aggregator,
            started: Instant::now(),
        }
    }

    pub fn run<P, S>(&self, prompter: &mut P, submitter: &mut S) -> Result<Outcome>
    where
        P: Prompter,
        S: Submit,
    {
        prompter.say("")?;
        prompter.say(BANNER)?;
        prompter.say(&format!("    CxMS Telemetry Reporter v{}", CLIENT_VERSION))?;
        prompter.say(BANNER)?;

        prompter.say("\nScanning for CxMS files...")?;
        let files = artifacts::locate(&self.project_dir)?;

        if !files.contains(ArtifactKind::ClaudeMd) {
            tracing::info!(dir = %self.project_dir.display(), "No manifest found");
            prompter.say("\nNo CLAUDE.md found. Is this a CxMS project?")?;
            prompter.say("   Run this command from your project root directory.\n")?;
            return Ok(Outcome::MissingManifest);
        }
        prompter.say(&format!("   Found {} CxMS files", files.len()))?;
        tracing::info!(artifacts = files.len(), "Scan complete");

        prompter.say("\nExtracting metrics...")?;
        let identity = IdentityStore::new(&self.project_dir).load()?;
        tracing::info!(
            submission_number = identity.submission_number,
            "Identity loaded"
        );
        let mut record = self.aggregator.assemble(&self.project_dir, &files, identity);

        if self.options.asks_feedback() {
            FeedbackCollector::new(&mut *prompter)
                .collect(self.options.survey_mode())?
                .apply_to(&mut record);
        }

        prompter.section("DATA SUMMARY")?;
        for line in preview::render_summary(&record).lines() {
            prompter.say(line)?;
        }

        if self.options.dry_run {
            self.stamp_timing(&mut record);
            return self.finish_dry_run(prompter, &record);
        }

        if self.options.skip_prompts && !self.options.auto_consent {
            prompter.say(
                "\n--skip-prompts used without --dry-run or --yes. \
                 Use --dry-run to preview or --yes to auto-consent.\n",
            )?;
            return Ok(Outcome::ConsentRequired);
        }

        if self.options.auto_consent {
            prompter.say("\nAuto-consenting (--yes flag)")?;
        } else {
            prompter.say(&format!("\n{}", BANNER))?;
            let answer =
                prompter.ask("Send this data anonymously to help improve CxMS? [y/N]: ")?;
            if !answer.eq_ignore_ascii_case("y") {
                tracing::info!("Consent declined");
                prompter.say("\nNo data sent. Thanks anyway!\n")?;
                return Ok(Outcome::Declined);
            }
        }

        self.stamp_timing(&mut record);
        prompter.say("\nSubmitting...")?;
        if let Some(seconds) = record.timing.script_duration_seconds {
            prompter.say(&format!("   (Script took {}s)", seconds))?;
        }

        match submitter.submit(&record) {
            Ok(()) => {
                tracing::info!("Submission accepted");
                prompter.say("\nThanks! Your anonymous feedback helps improve CxMS.")?;
                prompter.say(&format!("   View community stats: {}\n", STATS_URL))?;
                Ok(Outcome::Submitted)
            }
            Err(e) => {
                let reason = match e {
                    Error::Submit(reason) => reason,
                    other => other.to_string(),
                };
                tracing::warn!(reason = %reason, "Submission failed");
                prompter.say(&format!("\nFailed to submit: {}", reason))?;
                prompter.say(&format!("   You can report issues at: {}\n", ISSUES_URL))?;
                Ok(Outcome::SubmitFailed(reason))
            }
        }
    }

    fn stamp_timing(&self, record: &mut MetricsRecord) {
        record.timing = Timing::measured(self.started_at, self.started.elapsed());
    }

    fn finish_dry_run<P: Prompter>(&self, prompter: &mut P, record: &MetricsRecord) -> Result<Outcome> {
        prompter.say("\nFull JSON (--dry-run mode):\n")?;
        prompter.say(&record.to_pretty_json()?)?;

        if let Some(seconds) = record.timing.script_duration_seconds {
            prompter.say(&format!("\nScript duration: {}s", seconds))?;
        }
        let environment = &record.environment;
        prompter.say(&format!(
            "Timezone: {} (UTC{}{})",
            environment.timezone.as_deref().unwrap_or("unknown"),
            if environment.utc_offset_hours >= 0.0 { "+" } else { "" },
            environment.utc_offset_hours
        ))?;
        prompter.say("\nDry run complete. No data was sent.\n")?;

        tracing::info!("Dry run complete");
        Ok(Outcome::DryRun)
    }
}
