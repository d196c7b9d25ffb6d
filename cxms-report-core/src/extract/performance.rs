//! `*_Performance_Log.md` extractor.
//!
//! Performance logs are free-form; each figure is captured on its own so a
//! log that only mentions effectiveness still reports effectiveness.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::read_artifact;
use super::session::SESSION_HEADING_RE;

static RESTORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Context\s*[Rr]estore.*?(\d+\.?\d*)\s*min").unwrap());

static COMPACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Cc]ompaction.*?(\d+\.?\d*)").unwrap());

static REEXPLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Rr]e-?explain.*?(\d+\.?\d*)").unwrap());

static EFFECTIVENESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Ee]ffectiveness.*?(\d+)").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceFragment {
    /// `## Session N` headings in the log
    pub sessions_tracked: usize,
    pub avg_context_restore_minutes: Option<f64>,
    pub avg_compaction_events: Option<f64>,
    pub avg_reexplain_requests: Option<f64>,
    pub self_rated_effectiveness: Option<u32>,
}

/// `None` when there is no performance log (or it cannot be read).
pub fn extract(path: Option<&Path>) -> Option<PerformanceFragment> {
    read_artifact(path).map(|text| from_text(&text))
}

pub fn from_text(text: &str) -> PerformanceFragment {
    PerformanceFragment {
        sessions_tracked: SESSION_HEADING_RE.find_iter(text).count(),
        avg_context_restore_minutes: capture(&RESTORE_RE, text),
        avg_compaction_events: capture(&COMPACTION_RE, text),
        avg_reexplain_requests: capture(&REEXPLAIN_RE, text),
        self_rated_effectiveness: capture(&EFFECTIVENESS_RE, text),
    }
}

fn capture<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
