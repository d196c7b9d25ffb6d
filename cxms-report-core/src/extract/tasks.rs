//! `*_Tasks.md` extractor.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::read_artifact;

static ACTIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"- \[ \]").unwrap());

static COMPLETED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)- \[x\]").unwrap());

/// Checkbox tallies from a task list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFragment {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
    /// Occurrences of "blocked", any case
    pub blocked: usize,
    /// `completed / total`; `None` when there are no checkbox items
    pub completion_rate: Option<f64>,
}

impl TaskFragment {
    /// Build a fragment from raw tallies, deriving the total and rate.
    pub fn from_counts(active: usize, completed: usize, blocked: usize) -> Self {
        let total = active + completed;
        let completion_rate = (total > 0).then(|| completed as f64 / total as f64);
        Self {
            active,
            completed,
            total,
            blocked,
            completion_rate,
        }
    }
}

pub fn extract(path: Option<&Path>) -> TaskFragment {
    read_artifact(path)
        .map(|text| from_text(&text))
        .unwrap_or_default()
}

pub fn from_text(text: &str) -> TaskFragment {
    let active = ACTIVE_RE.find_iter(text).count();
    let completed = COMPLETED_RE.find_iter(text).count();
    let blocked = text.to_lowercase().matches("blocked").count();
    TaskFragment::from_counts(active, completed, blocked)
}
