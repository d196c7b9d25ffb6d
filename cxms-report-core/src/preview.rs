//! Human-readable summary of a metrics record
//!
//! Shows the key fields only. The full record is printed as JSON by the
//! dry-run path.

use std::fmt::{Display, Write};

use crate::artifacts::ArtifactKind;
use crate::types::MetricsRecord;

const UNKNOWN: &str = "Unknown";

/// Render the summary shown before consent is asked.
pub fn render_summary(record: &MetricsRecord) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_summary(&mut out, record);
    out
}

fn write_summary(out: &mut String, record: &MetricsRecord) -> std::fmt::Result {
    let identity = &record.identity;
    writeln!(out, "\nConfiguration:")?;
    field(out, "CxMS Version", or_unknown(identity.cxms_version.as_deref()))?;
    field(
        out,
        "Deployment Level",
        or_unknown(identity.deployment_level.as_deref()),
    )?;
    field(out, "Platform", &identity.os_platform)?;

    let lifecycle = &record.lifecycle;
    writeln!(out, "\nProject Lifecycle:")?;
    field(
        out,
        "First Session",
        or_unknown(lifecycle.first_session_date.as_deref()),
    )?;
    field(
        out,
        "Last Session",
        or_unknown(lifecycle.last_session_date.as_deref()),
    )?;
    field(out, "Total Sessions", lifecycle.total_session_count)?;
    match lifecycle.project_age_days {
        Some(days) => field(out, "Project Age", format!("{} days", days))?,
        None => field(out, "Project Age", UNKNOWN)?,
    }

    let files = &record.files;
    let present = files.present.values().filter(|present| **present).count();
    writeln!(out, "\nFiles Present:")?;
    writeln!(
        out,
        "  {} of {} CxMS files",
        present,
        ArtifactKind::ALL.len()
    )?;
    field(
        out,
        "Total footprint",
        format!("{} lines", files.total_cxms_footprint),
    )?;
    if !files.files_over_200_lines.is_empty() {
        field(out, "Large files", files.files_over_200_lines.join(", "))?;
    }

    writeln!(out, "\nMetrics:")?;
    field(out, "Active Tasks", record.tasks.active)?;
    field(out, "Completed Tasks", record.tasks.completed)?;
    field(out, "Decisions Logged", record.tracking.decision_count)?;
    field(
        out,
        "Compaction Events",
        record.tracking.compaction_log_entries,
    )?;

    let performance = &record.performance;
    if performance.has_performance_log {
        writeln!(out, "\nPerformance:")?;
        field(out, "Sessions Tracked", performance.sessions_tracked)?;
        if let Some(minutes) = performance.avg_context_restore_minutes {
            field(out, "Avg Restore", format!("{} min", minutes))?;
        }
        if let Some(rating) = performance.self_rated_effectiveness {
            field(out, "Effectiveness", format!("{}/5", rating))?;
        }
    }

    let context = &record.user_context;
    let feedback = &record.feedback;
    let answered = [
        ("Project Type", context.project_type.as_deref()),
        ("Team Size", context.team_size.as_deref()),
        ("AI Tool", context.primary_ai_tool.as_deref()),
        ("Top Benefit", feedback.top_benefit.as_deref()),
        ("Top Challenge", feedback.top_challenge.as_deref()),
    ];
    if answered.iter().any(|(_, value)| value.is_some()) {
        writeln!(out, "\nYour Feedback:")?;
        for (label, value) in answered {
            if let Some(value) = value {
                field(out, label, value)?;
            }
        }
    }

    Ok(())
}

fn field(out: &mut String, label: &str, value: impl Display) -> std::fmt::Result {
    writeln!(out, "  {:<19}{}", format!("{}:", label), value)
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricsRecord {
        let mut record = MetricsRecord::default();
        record.identity.os_platform = "linux".to_string();
        record.identity.cxms_version = Some("1.6".to_string());
        record.lifecycle.total_session_count = 4;
        record.lifecycle.project_age_days = Some(0);
        for kind in ArtifactKind::ALL {
            record
                .files
                .present
                .insert(kind.as_str().to_string(), kind == ArtifactKind::ClaudeMd);
        }
        record.files.total_cxms_footprint = 312;
        record.tasks.active = 3;
        record
    }

    #[test]
    fn test_summary_key_fields() {
        let summary = render_summary(&sample());
        assert!(summary.contains("CxMS Version:      1.6"));
        assert!(summary.contains("Deployment Level:  Unknown"));
        assert!(summary.contains("Platform:          linux"));
        assert!(summary.contains("Total Sessions:    4"));
        assert!(summary.contains("Project Age:       0 days"));
        assert!(summary.contains("1 of 16 CxMS files"));
        assert!(summary.contains("Total footprint:   312 lines"));
        assert!(summary.contains("Active Tasks:      3"));
    }

    #[test]
    fn test_optional_sections_hidden() {
        let summary = render_summary(&sample());
        assert!(!summary.contains("Large files"));
        assert!(!summary.contains("Performance:"));
        assert!(!summary.contains("Your Feedback:"));
    }

    #[test]
    fn test_optional_sections_shown() {
        let mut record = sample();
        record.files.files_over_200_lines = vec!["session_md".to_string(), "tasks_md".to_string()];
        record.performance.has_performance_log = true;
        record.performance.sessions_tracked = 2;
        record.performance.avg_context_restore_minutes = Some(2.5);
        record.user_context.team_size = Some("solo".to_string());

        let summary = render_summary(&record);
        assert!(summary.contains("Large files:       session_md, tasks_md"));
        assert!(summary.contains("Avg Restore:       2.5 min"));
        assert!(!summary.contains("Effectiveness"));
        assert!(summary.contains("Team Size:         solo"));
        assert!(!summary.contains("Project Type"));
    }
}
