//! `*_Session.md` extractor.
//!
//! The session log grows one `## Session N` block per working session, often
//! with a `## TL;DR` recap and a `## Session Metrics` table.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use chrono::NaiveDate;

use super::dates::{collect_date_strings, first_date};
use super::read_artifact;

pub(crate) static SESSION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Session\s*\d+").unwrap());

static TLDR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)##\s*TL;?DR").unwrap());

static METRICS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)##\s*Session\s*Metrics").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFragment {
    /// Number of `Session <n>` headings
    pub session_count: usize,
    /// Whether a TL;DR section exists
    pub has_tldr: bool,
    /// Whether a session metrics section exists
    pub has_metrics: bool,
    /// Raw date strings in document order, unparsed
    pub dates: Vec<String>,
    /// First parsable date of each `Session <n>` block that has one
    pub session_dates: Vec<NaiveDate>,
}

pub fn extract(path: Option<&Path>) -> SessionFragment {
    read_artifact(path)
        .map(|text| from_text(&text))
        .unwrap_or_default()
}

pub fn from_text(text: &str) -> SessionFragment {
    SessionFragment {
        session_count: SESSION_HEADING_RE.find_iter(text).count(),
        has_tldr: TLDR_RE.is_match(text),
        has_metrics: METRICS_RE.is_match(text),
        dates: collect_date_strings(text),
        session_dates: session_block_dates(text),
    }
}

/// One date per session block: the first one found between its heading and
/// the next session heading.
fn session_block_dates(text: &str) -> Vec<NaiveDate> {
    let starts: Vec<usize> = SESSION_HEADING_RE.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            first_date(&text[start..end])
        })
        .collect()
}
