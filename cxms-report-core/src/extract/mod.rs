//! Per-artifact heuristic extractors
//!
//! Each extractor turns one artifact into a small typed fragment. They are
//! pure with respect to the metrics record and never fail: a missing or
//! unreadable file yields the default fragment, and text the heuristics do not
//! recognise yields zero counts and `None` values.
//!
//! | Extractor | Artifact | Fragment |
//! |-----------|----------|----------|
//! | [`manifest`] | `CLAUDE.md` | [`ManifestFragment`] |
//! | [`session`] | `*_Session.md` | [`SessionFragment`] |
//! | [`tasks`] | `*_Tasks.md` | [`TaskFragment`] |
//! | [`logs`] | decision / activity / compaction / prompt-history logs | entry counts |
//! | [`performance`] | `*_Performance_Log.md` | `Option<`[`PerformanceFragment`]`>` |
//! | [`stats`] | any artifact | [`FileStats`] |

pub mod dates;
pub mod logs;
pub mod manifest;
pub mod performance;
pub mod session;
pub mod stats;
pub mod tasks;

pub use manifest::ManifestFragment;
pub use performance::PerformanceFragment;
pub use session::SessionFragment;
pub use stats::FileStats;
pub use tasks::TaskFragment;

use std::path::Path;

/// Read an artifact as text, tolerating invalid UTF-8.
///
/// Returns `None` when there is no path or the file cannot be read.
pub(crate) fn read_artifact(path: Option<&Path>) -> Option<String> {
    let path = path?;
    match std::fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Artifact unreadable, skipping");
            None
        }
    }
}
