//! The metrics record sent to the collection endpoint
//!
//! The record has a fixed shape: every group is always present and every leaf
//! is always serialized, using `null`, `[]` or `{}` when nothing is known.
//! Server-side aggregation relies on that, so none of these types use
//! `skip_serializing_if`.
//!
//! | Group | Filled by |
//! |-------|-----------|
//! | `identity` | identity store + manifest extractor |
//! | `lifecycle`, `context_health` | session extractor + aggregator |
//! | `files` | file stats + directory scan |
//! | `tasks` | task extractor |
//! | `tracking` | log extractors |
//! | `performance` | performance extractor (defaults when no log) |
//! | `environment` | directory scan + host environment |
//! | `user_context`, `feedback`, `feature_interest` | feedback collector |
//! | `timing` | workflow, at preview (dry run) or submission |

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub identity: IdentityMetrics,
    pub lifecycle: LifecycleMetrics,
    pub files: FileMetrics,
    pub tasks: TaskMetrics,
    pub tracking: TrackingMetrics,
    pub context_health: ContextHealth,
    pub performance: PerformanceMetrics,
    pub environment: EnvironmentInfo,
    pub user_context: UserContext,
    pub feedback: Feedback,
    /// Feature → interested? Only answered questions have entries.
    pub feature_interest: BTreeMap<String, bool>,
    pub timing: Timing,
    /// When the record was assembled (RFC 3339, UTC)
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityMetrics {
    /// Anonymous per-project id, stable across runs
    pub installation_id: String,
    /// 1 on the first run in a project, +1 per run
    pub submission_number: u64,
    pub client_version: String,
    pub os_platform: String,
    pub cxms_version: Option<String>,
    pub deployment_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleMetrics {
    /// `YYYY-MM-DD`
    pub first_session_date: Option<String>,
    /// `YYYY-MM-DD`
    pub last_session_date: Option<String>,
    pub project_age_days: Option<i64>,
    pub days_since_last_session: Option<i64>,
    pub total_session_count: usize,
    pub sessions_last_30_days: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    /// Every artifact kind, present or not
    pub present: BTreeMap<String, bool>,
    /// Present artifacts only
    pub line_counts: BTreeMap<String, usize>,
    /// Days since modification, present artifacts only
    pub freshness: BTreeMap<String, i64>,
    pub total_cxms_footprint: usize,
    pub largest_file: Option<String>,
    pub largest_file_lines: usize,
    pub files_over_200_lines: Vec<String>,
    pub has_aging_files: bool,
    pub has_archive_folder: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub blocked: usize,
    pub completion_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingMetrics {
    pub decision_count: usize,
    pub activity_entries: usize,
    pub compaction_log_entries: usize,
    pub prompt_history_entries: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextHealth {
    pub has_tldr_sections: bool,
    pub has_session_metrics: bool,
    pub session_md_freshness_days: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub has_performance_log: bool,
    pub sessions_tracked: usize,
    pub avg_context_restore_minutes: Option<f64>,
    pub avg_compaction_events: Option<f64>,
    pub avg_reexplain_requests: Option<f64>,
    pub self_rated_effectiveness: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub uses_git: bool,
    pub has_cxms_folder: bool,
    /// Other assistants' instruction files found next to `CLAUDE.md`
    pub multi_tool_configs: Vec<String>,
    /// IANA zone name, e.g. `Europe/Berlin`
    pub timezone: Option<String>,
    /// Language tag, e.g. `en-US`
    pub locale: Option<String>,
    pub utc_offset_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub project_type: Option<String>,
    pub team_size: Option<String>,
    pub primary_ai_tool: Option<String>,
    pub country: Option<String>,
    pub using_cxms_since: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub top_benefit: Option<String>,
    pub top_challenge: Option<String>,
    /// 1..=10
    pub would_recommend_score: Option<u8>,
    pub free_feedback: Option<String>,
}

/// Wall-clock timing of the run. Unset until preview or submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub script_start_time: Option<String>,
    pub script_duration_seconds: Option<u64>,
}

impl Timing {
    /// Timing for a run that started at `started_at` and took `elapsed`.
    ///
    /// Duration is rounded to whole seconds.
    pub fn measured(started_at: DateTime<Utc>, elapsed: std::time::Duration) -> Self {
        Self {
            script_start_time: Some(started_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            script_duration_seconds: Some(elapsed.as_secs_f64().round() as u64),
        }
    }
}

impl MetricsRecord {
    pub fn is_timed(&self) -> bool {
        self.timing.script_start_time.is_some()
    }

    /// Pretty JSON exactly as it would be submitted
    pub fn to_pretty_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
