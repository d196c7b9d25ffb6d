//! Size and freshness of an artifact.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::read_artifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// Newline-delimited segments; an empty file has one
    pub lines: usize,
    /// Whole days since last modification
    pub modified_days_ago: i64,
}

/// Stats for one artifact relative to `now`; `None` if it cannot be read.
pub fn extract(path: &Path, now: DateTime<Utc>) -> Option<FileStats> {
    let text = read_artifact(Some(path))?;
    let modified: DateTime<Utc> = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::from)
        .ok()?;

    Some(FileStats {
        lines: line_count(&text),
        modified_days_ago: days_between(modified, now),
    })
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Floor of elapsed seconds / 86400.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(86_400)
}
