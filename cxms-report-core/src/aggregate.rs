//! Metrics aggregation
//!
//! Combines the located artifacts, every extractor's fragment, the project
//! identity and a few directory/host facts into one [`MetricsRecord`].
//!
//! Given the same filesystem state and the same `now`, [`Aggregator::assemble`]
//! produces the same record; only `timing` is left for the workflow to stamp.

use std::ffi::OsString;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::artifacts::{list_entry_names, ArtifactKind, ResolvedFiles};
use crate::extract::{self, dates, FileStats, PerformanceFragment, SessionFragment};
use crate::identity::{Identity, STATE_DIR};
use crate::types::{
    ContextHealth, EnvironmentInfo, FileMetrics, IdentityMetrics, LifecycleMetrics, MetricsRecord,
    PerformanceMetrics, TaskMetrics, TrackingMetrics,
};

/// Reporter version stamped into every record
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Files with more lines than this are flagged as large
pub const LARGE_FILE_THRESHOLD: usize = 200;

/// Instruction files of other assistants looked for in the project root
pub const MULTI_TOOL_CONFIGS: [&str; 3] = ["GEMINI.md", ".cursorrules", "copilot-instructions.md"];

/// Substring marking an aged-out log file (`Shop_Activity_Log_Aging_2025.md`)
const AGING_MARKER: &str = "_Aging_";

const ARCHIVE_DIR: &str = "Archive";

/// Window for `sessions_last_30_days`
const RECENT_WINDOW_DAYS: i64 = 30;

/// Facts about the machine running the reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEnvironment {
    pub os_platform: String,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    pub utc_offset_hours: f64,
}

impl HostEnvironment {
    /// Collect host facts from the current process environment
    pub fn detect() -> Self {
        let offset_seconds = chrono::Local::now().offset().local_minus_utc();
        Self {
            os_platform: platform_name(std::env::consts::OS).to_string(),
            timezone: iana_time_zone::get_timezone().ok(),
            locale: ["LC_ALL", "LC_MESSAGES", "LANG"]
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find_map(|raw| normalize_locale(&raw)),
            utc_offset_hours: f64::from(offset_seconds) / 3600.0,
        }
    }
}

/// Platform names as reported by earlier versions of the reporter.
fn platform_name(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// `en_US.UTF-8` → `en-US`. `C` and `POSIX` carry no locale information.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.split(['.', '@']).next()?.trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}

/// Builds metrics records relative to a fixed instant.
#[derive(Debug, Clone)]
pub struct Aggregator {
    now: DateTime<Utc>,
    host: HostEnvironment,
}

impl Aggregator {
    /// Aggregator for the current host
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_host(now, HostEnvironment::detect())
    }

    pub fn with_host(now: DateTime<Utc>, host: HostEnvironment) -> Self {
        Self { now, host }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Assemble the full record for `dir`.
    ///
    /// Never fails: unreadable artifacts contribute empty fragments and an
    /// unreadable directory listing contributes no environment hits.
    pub fn assemble(&self, dir: &Path, files: &ResolvedFiles, identity: Identity) -> MetricsRecord {
        let manifest = extract::manifest::extract(files.get(ArtifactKind::ClaudeMd));
        let session = extract::session::extract(files.get(ArtifactKind::SessionMd));
        let tasks = extract::tasks::extract(files.get(ArtifactKind::TasksMd));
        let performance = extract::performance::extract(files.get(ArtifactKind::PerformanceLogMd));

        let entries = list_entry_names(dir).unwrap_or_else(|e| {
            tracing::debug!(dir = %dir.display(), error = %e, "Directory listing failed");
            Vec::new()
        });

        let file_metrics = self.file_metrics(dir, files, &entries);
        let session_freshness = file_metrics
            .freshness
            .get(ArtifactKind::SessionMd.as_str())
            .copied();

        tracing::debug!(
            artifacts = files.len(),
            sessions = session.session_count,
            tasks = tasks.total,
            has_performance_log = performance.is_some(),
            "Assembled metrics"
        );

        MetricsRecord {
            identity: IdentityMetrics {
                installation_id: identity.installation_id,
                submission_number: identity.submission_number,
                client_version: CLIENT_VERSION.to_string(),
                os_platform: self.host.os_platform.clone(),
                cxms_version: manifest.cxms_version,
                deployment_level: manifest.deployment_level,
            },
            lifecycle: self.lifecycle(&session),
            files: file_metrics,
            tasks: TaskMetrics {
                total: tasks.total,
                active: tasks.active,
                completed: tasks.completed,
                blocked: tasks.blocked,
                completion_rate: tasks.completion_rate,
            },
            tracking: TrackingMetrics {
                decision_count: extract::logs::decision_count(
                    files.get(ArtifactKind::DecisionLogMd),
                ),
                activity_entries: extract::logs::activity_count(
                    files.get(ArtifactKind::ActivityLogMd),
                ),
                compaction_log_entries: extract::logs::compaction_count(
                    files.get(ArtifactKind::CompactionLogMd),
                ),
                prompt_history_entries: extract::logs::prompt_history_count(
                    files.get(ArtifactKind::PromptHistoryMd),
                ),
            },
            context_health: ContextHealth {
                has_tldr_sections: session.has_tldr,
                has_session_metrics: session.has_metrics,
                session_md_freshness_days: session_freshness,
            },
            performance: performance
                .map(performance_metrics)
                .unwrap_or_default(),
            environment: EnvironmentInfo {
                uses_git: dir.join(".git").exists(),
                has_cxms_folder: dir.join(STATE_DIR).is_dir(),
                multi_tool_configs: MULTI_TOOL_CONFIGS
                    .iter()
                    .filter(|name| entries.iter().any(|entry| entry.to_string_lossy() == **name))
                    .map(|name| name.to_string())
                    .collect(),
                timezone: self.host.timezone.clone(),
                locale: self.host.locale.clone(),
                utc_offset_hours: self.host.utc_offset_hours,
            },
            submitted_at: Some(self.now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..MetricsRecord::default()
        }
    }

    fn file_metrics(&self, dir: &Path, files: &ResolvedFiles, entries: &[OsString]) -> FileMetrics {
        let mut metrics = FileMetrics {
            has_aging_files: entries.iter().any(|name| name.to_string_lossy().contains(AGING_MARKER)),
            has_archive_folder: dir.join(ARCHIVE_DIR).is_dir(),
            ..FileMetrics::default()
        };

        for kind in ArtifactKind::ALL {
            metrics
                .present
                .insert(kind.as_str().to_string(), files.contains(kind));
        }

        for (kind, path) in files.iter() {
            let Some(FileStats {
                lines,
                modified_days_ago,
            }) = extract::stats::extract(path, self.now)
            else {
                continue;
            };

            let key = kind.as_str().to_string();
            metrics.line_counts.insert(key.clone(), lines);
            metrics.freshness.insert(key.clone(), modified_days_ago);
            metrics.total_cxms_footprint += lines;

            if lines > metrics.largest_file_lines {
                metrics.largest_file = Some(key.clone());
                metrics.largest_file_lines = lines;
            }
            if lines > LARGE_FILE_THRESHOLD {
                metrics.files_over_200_lines.push(key);
            }
        }

        metrics
    }

    fn lifecycle(&self, session: &SessionFragment) -> LifecycleMetrics {
        let dates = dates::sorted_dates(&session.dates);
        let mut lifecycle = LifecycleMetrics {
            total_session_count: session.session_count,
            ..LifecycleMetrics::default()
        };

        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            return lifecycle;
        };

        lifecycle.first_session_date = Some(first.format("%Y-%m-%d").to_string());
        lifecycle.last_session_date = Some(last.format("%Y-%m-%d").to_string());
        lifecycle.project_age_days = Some(self.days_since(*first));
        lifecycle.days_since_last_session = Some(self.days_since(*last));

        lifecycle.sessions_last_30_days = Some(
            session
                .session_dates
                .iter()
                .filter(|date| (0..RECENT_WINDOW_DAYS).contains(&self.days_since(**date)))
                .count(),
        );

        lifecycle
    }

    /// Whole days from UTC midnight of `date` to `now`.
    fn days_since(&self, date: NaiveDate) -> i64 {
        extract::stats::days_between(date.and_time(NaiveTime::MIN).and_utc(), self.now)
    }
}

fn performance_metrics(fragment: PerformanceFragment) -> PerformanceMetrics {
    PerformanceMetrics {
        has_performance_log: true,
        sessions_tracked: fragment.sessions_tracked,
        avg_context_restore_minutes: fragment.avg_context_restore_minutes,
        avg_compaction_events: fragment.avg_compaction_events,
        avg_reexplain_requests: fragment.avg_reexplain_requests,
        self_rated_effectiveness: fragment.self_rated_effectiveness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::locate;
    use std::fs;
    use tempfile::TempDir;

    fn host() -> HostEnvironment {
        HostEnvironment {
            os_platform: "linux".to_string(),
            timezone: Some("Europe/Berlin".to_string()),
            locale: Some("de-DE".to_string()),
            utc_offset_hours: 1.0,
        }
    }

    fn identity() -> Identity {
        Identity {
            installation_id: "id-1".to_string(),
            submission_number: 1,
        }
    }

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_normalize_locale() {
        assert_eq!(normalize_locale("en_US.UTF-8").as_deref(), Some("en-US"));
        assert_eq!(normalize_locale("de_DE@euro").as_deref(), Some("de-DE"));
        assert_eq!(normalize_locale("fr").as_deref(), Some("fr"));
        assert_eq!(normalize_locale("C.UTF-8"), None);
        assert_eq!(normalize_locale("POSIX"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn test_platform_names() {
        assert_eq!(platform_name("macos"), "darwin");
        assert_eq!(platform_name("windows"), "win32");
        assert_eq!(platform_name("linux"), "linux");
    }

    #[test]
    fn test_lifecycle_from_session_dates() {
        let dir = project(&[
            ("CLAUDE.md", "**Version:** 1.2"),
            (
                "Shop_Session.md",
                "## Session 1\n2026-01-01\n## Session 2\n2026-01-10\nnot a date 2026-02-31\n",
            ),
        ]);
        let files = locate(dir.path()).unwrap();
        let aggregator = Aggregator::with_host(at("2026-01-20T12:00:00Z"), host());

        let record = aggregator.assemble(dir.path(), &files, identity());
        let lifecycle = &record.lifecycle;
        assert_eq!(lifecycle.total_session_count, 2);
        assert_eq!(lifecycle.first_session_date.as_deref(), Some("2026-01-01"));
        assert_eq!(lifecycle.last_session_date.as_deref(), Some("2026-01-10"));
        assert_eq!(lifecycle.project_age_days, Some(19));
        assert_eq!(lifecycle.days_since_last_session, Some(10));
        assert_eq!(lifecycle.sessions_last_30_days, Some(2));
        assert_eq!(record.identity.cxms_version.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_recent_sessions_count_blocks_not_dates() {
        let dir = project(&[
            ("CLAUDE.md", ""),
            (
                "Shop_Session.md",
                "\
## Session 1 - 2025-11-01
## Session 2 - 2026-01-05
Ship by 2026-01-09, review 2026-01-12
## Session 3 - 2026-01-05
Second sitting the same day
## Session 4
undated
",
            ),
        ]);
        let files = locate(dir.path()).unwrap();
        let aggregator = Aggregator::with_host(at("2026-01-20T12:00:00Z"), host());

        let lifecycle = aggregator.assemble(dir.path(), &files, identity()).lifecycle;
        assert_eq!(lifecycle.total_session_count, 4);
        assert_eq!(lifecycle.sessions_last_30_days, Some(2));
        assert_eq!(lifecycle.last_session_date.as_deref(), Some("2026-01-12"));
    }

    #[test]
    fn test_no_dates_leaves_lifecycle_unknown() {
        let dir = project(&[("CLAUDE.md", ""), ("Shop_Session.md", "## Session 1\n")]);
        let files = locate(dir.path()).unwrap();
        let record = Aggregator::with_host(Utc::now(), host()).assemble(
            dir.path(),
            &files,
            identity(),
        );
        assert_eq!(record.lifecycle.total_session_count, 1);
        assert_eq!(record.lifecycle.first_session_date, None);
        assert_eq!(record.lifecycle.project_age_days, None);
        assert_eq!(record.lifecycle.sessions_last_30_days, None);
    }

    #[test]
    fn test_file_footprint_and_largest() {
        let big = "line\n".repeat(250);
        let dir = project(&[
            ("CLAUDE.md", "a\nb"),
            ("Shop_Plan.md", &big),
            ("Shop_Tasks.md", "- [ ] x\n- [x] y"),
        ]);
        let files = locate(dir.path()).unwrap();
        let record = Aggregator::with_host(Utc::now(), host()).assemble(
            dir.path(),
            &files,
            identity(),
        );

        let metrics = &record.files;
        assert_eq!(metrics.present.len(), 16);
        assert!(metrics.present["plan_md"]);
        assert!(!metrics.present["session_md"]);
        assert_eq!(metrics.line_counts["claude_md"], 2);
        assert_eq!(metrics.line_counts["plan_md"], 251);
        assert_eq!(metrics.total_cxms_footprint, 2 + 251 + 2);
        assert_eq!(metrics.largest_file.as_deref(), Some("plan_md"));
        assert_eq!(metrics.largest_file_lines, 251);
        assert_eq!(metrics.files_over_200_lines, vec!["plan_md".to_string()]);
        assert_eq!(metrics.freshness["plan_md"], 0);
        assert!(!metrics.line_counts.contains_key("session_md"));
        assert_eq!(record.tasks.completion_rate, Some(0.5));
    }

    #[test]
    fn test_environment_scan() {
        let dir = project(&[
            ("CLAUDE.md", ""),
            ("GEMINI.md", ""),
            (".cursorrules", ""),
            ("Shop_Activity_Log_Aging_2025.md", ""),
        ]);
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join("Archive")).unwrap();
        let files = locate(dir.path()).unwrap();

        let record = Aggregator::with_host(Utc::now(), host()).assemble(
            dir.path(),
            &files,
            identity(),
        );
        let env = &record.environment;
        assert!(env.uses_git);
        assert!(!env.has_cxms_folder);
        assert_eq!(env.multi_tool_configs, vec!["GEMINI.md", ".cursorrules"]);
        assert_eq!(env.timezone.as_deref(), Some("Europe/Berlin"));
        assert!(record.files.has_aging_files);
        assert!(record.files.has_archive_folder);
    }

    #[test]
    fn test_performance_block_defaults_without_log() {
        let dir = project(&[("CLAUDE.md", "")]);
        let files = locate(dir.path()).unwrap();
        let record = Aggregator::with_host(Utc::now(), host()).assemble(
            dir.path(),
            &files,
            identity(),
        );
        assert_eq!(record.performance, PerformanceMetrics::default());
        assert!(!record.is_timed());
    }

    #[test]
    fn test_performance_block_merged() {
        let dir = project(&[
            ("CLAUDE.md", ""),
            ("Shop_Performance_Log.md", "Effectiveness: 4\n"),
        ]);
        let files = locate(dir.path()).unwrap();
        let record = Aggregator::with_host(Utc::now(), host()).assemble(
            dir.path(),
            &files,
            identity(),
        );
        assert!(record.performance.has_performance_log);
        assert_eq!(record.performance.self_rated_effectiveness, Some(4));
        assert_eq!(record.performance.avg_context_restore_minutes, None);
    }
}
