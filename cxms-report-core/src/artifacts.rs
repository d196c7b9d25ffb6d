//! Artifact discovery
//!
//! A CxMS project keeps its context in a handful of markdown files next to the
//! `CLAUDE.md` manifest. Companion files are named `<Project>_<Kind>.md`, so
//! every kind except the manifest is recognised by suffix.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How an artifact kind is recognised in a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Case-sensitive exact file name
    Exact(&'static str),
    /// File name ends with the given suffix
    Suffix(&'static str),
}

impl MatchRule {
    /// Whether a directory entry name satisfies this rule
    pub fn matches(&self, name: &str) -> bool {
        match self {
            MatchRule::Exact(exact) => name == *exact,
            MatchRule::Suffix(suffix) => name.ends_with(suffix),
        }
    }
}

/// The fixed set of artifact kinds the reporter recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    ClaudeMd,
    SessionMd,
    TasksMd,
    ContextMd,
    PromptHistoryMd,
    ActivityLogMd,
    DecisionLogMd,
    IssueLogMd,
    DeploymentMd,
    PerformanceLogMd,
    CompactionLogMd,
    PlanMd,
    InventoryMd,
    StrategyMd,
    ExceptionsMd,
    PromptLibraryMd,
}

impl ArtifactKind {
    /// All kinds, in reporting order
    pub const ALL: [ArtifactKind; 16] = [
        ArtifactKind::ClaudeMd,
        ArtifactKind::SessionMd,
        ArtifactKind::TasksMd,
        ArtifactKind::ContextMd,
        ArtifactKind::PromptHistoryMd,
        ArtifactKind::ActivityLogMd,
        ArtifactKind::DecisionLogMd,
        ArtifactKind::IssueLogMd,
        ArtifactKind::DeploymentMd,
        ArtifactKind::PerformanceLogMd,
        ArtifactKind::CompactionLogMd,
        ArtifactKind::PlanMd,
        ArtifactKind::InventoryMd,
        ArtifactKind::StrategyMd,
        ArtifactKind::ExceptionsMd,
        ArtifactKind::PromptLibraryMd,
    ];

    /// Key used for this kind in the metrics record
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::ClaudeMd => "claude_md",
            ArtifactKind::SessionMd => "session_md",
            ArtifactKind::TasksMd => "tasks_md",
            ArtifactKind::ContextMd => "context_md",
            ArtifactKind::PromptHistoryMd => "prompt_history_md",
            ArtifactKind::ActivityLogMd => "activity_log_md",
            ArtifactKind::DecisionLogMd => "decision_log_md",
            ArtifactKind::IssueLogMd => "issue_log_md",
            ArtifactKind::DeploymentMd => "deployment_md",
            ArtifactKind::PerformanceLogMd => "performance_log_md",
            ArtifactKind::CompactionLogMd => "compaction_log_md",
            ArtifactKind::PlanMd => "plan_md",
            ArtifactKind::InventoryMd => "inventory_md",
            ArtifactKind::StrategyMd => "strategy_md",
            ArtifactKind::ExceptionsMd => "exceptions_md",
            ArtifactKind::PromptLibraryMd => "prompt_library_md",
        }
    }

    /// File-name rule for this kind
    pub fn match_rule(&self) -> MatchRule {
        match self {
            ArtifactKind::ClaudeMd => MatchRule::Exact("CLAUDE.md"),
            ArtifactKind::SessionMd => MatchRule::Suffix("_Session.md"),
            ArtifactKind::TasksMd => MatchRule::Suffix("_Tasks.md"),
            ArtifactKind::ContextMd => MatchRule::Suffix("_Context.md"),
            ArtifactKind::PromptHistoryMd => MatchRule::Suffix("_Prompt_History.md"),
            ArtifactKind::ActivityLogMd => MatchRule::Suffix("_Activity_Log.md"),
            ArtifactKind::DecisionLogMd => MatchRule::Suffix("_Decision_Log.md"),
            ArtifactKind::IssueLogMd => MatchRule::Suffix("_Issue_Log.md"),
            ArtifactKind::DeploymentMd => MatchRule::Suffix("_Deployment.md"),
            ArtifactKind::PerformanceLogMd => MatchRule::Suffix("_Performance_Log.md"),
            ArtifactKind::CompactionLogMd => MatchRule::Suffix("_Compaction_Log.md"),
            ArtifactKind::PlanMd => MatchRule::Suffix("_Plan.md"),
            ArtifactKind::InventoryMd => MatchRule::Suffix("_Inventory.md"),
            ArtifactKind::StrategyMd => MatchRule::Suffix("_Strategy.md"),
            ArtifactKind::ExceptionsMd => MatchRule::Suffix("_Exceptions.md"),
            ArtifactKind::PromptLibraryMd => MatchRule::Suffix("_Prompt_Library.md"),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifacts found in one project directory, at most one path per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFiles {
    files: BTreeMap<ArtifactKind, PathBuf>,
}

impl ResolvedFiles {
    /// Path for a kind, if one was found
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.files.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Found artifacts in kind order
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
        self.files.iter().map(|(kind, path)| (*kind, path.as_path()))
    }
}

/// Names of the entries directly inside `dir`, sorted.
///
/// Names are kept as the OS returned them so they can be joined back onto
/// `dir` even when they are not valid UTF-8. Sorting pins down which file
/// wins when several match the same suffix.
pub fn list_entry_names(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name());
    }
    names.sort();
    Ok(names)
}

/// Resolve every artifact kind against the given entry names.
///
/// Rules match against the lossy UTF-8 form of each name; the path is built
/// from the original name.
pub fn resolve(dir: &Path, names: &[OsString]) -> ResolvedFiles {
    let mut files = BTreeMap::new();
    for kind in ArtifactKind::ALL {
        let rule = kind.match_rule();
        if let Some(name) = names.iter().find(|name| rule.matches(&name.to_string_lossy())) {
            files.insert(kind, dir.join(name));
        }
    }
    ResolvedFiles { files }
}

/// Scan `dir` (non-recursively) for CxMS artifacts.
///
/// Finding nothing is not an error; only an unreadable directory is.
pub fn locate(dir: &Path) -> Result<ResolvedFiles> {
    let names = list_entry_names(dir)?;
    let resolved = resolve(dir, &names);
    tracing::debug!(
        dir = %dir.display(),
        entries = names.len(),
        found = resolved.len(),
        "Resolved artifacts"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "x").unwrap();
    }

    #[test]
    fn test_kind_keys_are_unique() {
        let mut keys: Vec<_> = ArtifactKind::ALL.iter().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 16);
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let rule = ArtifactKind::ClaudeMd.match_rule();
        assert!(rule.matches("CLAUDE.md"));
        assert!(!rule.matches("claude.md"));
        assert!(!rule.matches("MY_CLAUDE.md"));
    }

    #[test]
    fn test_locate_matches_suffixes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "CLAUDE.md");
        touch(dir.path(), "Shop_Session.md");
        touch(dir.path(), "Shop_Tasks.md");
        touch(dir.path(), "Shop_Decision_Log.md");
        touch(dir.path(), "README.md");

        let files = locate(dir.path()).unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(
            files.get(ArtifactKind::SessionMd),
            Some(dir.path().join("Shop_Session.md").as_path())
        );
        assert!(files.contains(ArtifactKind::DecisionLogMd));
        assert!(!files.contains(ArtifactKind::ActivityLogMd));
    }

    #[test]
    fn test_first_suffix_match_wins() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Beta_Tasks.md");
        touch(dir.path(), "Alpha_Tasks.md");

        let files = locate(dir.path()).unwrap();
        assert_eq!(
            files.get(ArtifactKind::TasksMd),
            Some(dir.path().join("Alpha_Tasks.md").as_path())
        );
    }

    #[test]
    fn test_locate_does_not_recurse() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        touch(&dir.path().join("docs"), "CLAUDE.md");

        let files = locate(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_name_resolves_to_real_file() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "CLAUDE.md");
        let name = OsStr::from_bytes(b"Caf\xe9_Tasks.md");
        fs::write(dir.path().join(name), "- [x] done\n").unwrap();

        let files = locate(dir.path()).unwrap();
        let tasks = files.get(ArtifactKind::TasksMd).expect("tasks file resolved");
        assert_eq!(tasks, dir.path().join(name).as_path());
        assert!(tasks.is_file());
        assert_eq!(fs::read_to_string(tasks).unwrap(), "- [x] done\n");
    }

    #[test]
    fn test_locate_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(locate(&dir.path().join("nope")).is_err());
    }
}
