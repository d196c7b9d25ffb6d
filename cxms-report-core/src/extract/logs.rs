//! Entry counters for the append-only logs.
//!
//! Decision, compaction and prompt-history logs add one `###` heading per
//! entry. The activity log is a markdown table, one row per entry.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::read_artifact;

static DECISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)###\s*(DEC-|Decision)").unwrap());

static TABLE_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\|[^|\n]+\|[^|\n]+\|[^|\n]+\|").unwrap());

static COMPACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)###\s*Compaction").unwrap());

static PROMPT_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^###\s+").unwrap());

/// Header row plus separator row assumed at the top of the activity table
const TABLE_HEADER_ROWS: usize = 2;

fn count_in(path: Option<&Path>, count: fn(&str) -> usize) -> usize {
    read_artifact(path).map(|text| count(&text)).unwrap_or(0)
}

pub fn decision_count(path: Option<&Path>) -> usize {
    count_in(path, decisions_in_text)
}

pub fn decisions_in_text(text: &str) -> usize {
    DECISION_RE.find_iter(text).count()
}

pub fn activity_count(path: Option<&Path>) -> usize {
    count_in(path, activity_rows_in_text)
}

pub fn activity_rows_in_text(text: &str) -> usize {
    TABLE_ROW_RE
        .find_iter(text)
        .count()
        .saturating_sub(TABLE_HEADER_ROWS)
}

pub fn compaction_count(path: Option<&Path>) -> usize {
    count_in(path, compactions_in_text)
}

pub fn compactions_in_text(text: &str) -> usize {
    COMPACTION_RE.find_iter(text).count()
}

pub fn prompt_history_count(path: Option<&Path>) -> usize {
    count_in(path, prompt_entries_in_text)
}

pub fn prompt_entries_in_text(text: &str) -> usize {
    PROMPT_ENTRY_RE.find_iter(text).count()
}
