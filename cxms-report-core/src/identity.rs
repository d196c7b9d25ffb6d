//! Project-local identity and submission counter
//!
//! Both values live as small text files in the project's `.cxms/` directory:
//!
//! ```text
//! .cxms/installation-id    random UUID, written once, regenerated only if empty
//! .cxms/submission-count   last submission number handed out
//! ```
//!
//! Each write goes to a temporary sibling file, is fsynced, then renamed over
//! the target, so an interrupted run leaves either the old value or the new
//! one. Nothing here locks across processes; two runs in the same directory
//! at once may race on the counter.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// Name of the state directory inside a project
pub const STATE_DIR: &str = ".cxms";

pub const INSTALLATION_ID_KEY: &str = "installation-id";

pub const SUBMISSION_COUNT_KEY: &str = "submission-count";

/// Version-control ignore file that gets the id path appended
const IGNORE_FILE: &str = ".gitignore";

/// A minimal key/value store: one trimmed text file per key.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store rooted at `<project_dir>/.cxms`
    pub fn for_project(project_dir: &Path) -> Self {
        Self {
            dir: project_dir.join(STATE_DIR),
        }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Trimmed value for `key`, or `None` if it was never written
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the value for `key` atomically and flush it to disk
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp_path = self.dir.join(format!(".{}.tmp", key));

        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, self.path_for(key)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Identity values for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub installation_id: String,
    pub submission_number: u64,
}

/// Identity values persisted for one project directory.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    project_dir: PathBuf,
    store: StateStore,
}

impl IdentityStore {
    pub fn new(project_dir: &Path) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            store: StateStore::for_project(project_dir),
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.store
    }

    /// Return the persisted installation id, creating it on first use.
    ///
    /// An existing id is returned verbatim (trimmed). An empty id file counts
    /// as missing. A new id is persisted before it is returned, and the
    /// project's `.gitignore`, if any, gets an entry for it. Failing to update
    /// `.gitignore` does not fail this call.
    pub fn installation_id(&self) -> Result<String> {
        if let Some(id) = self.store.read(INSTALLATION_ID_KEY)? {
            if !id.is_empty() {
                return Ok(id);
            }
            tracing::warn!("Installation id file is empty, regenerating");
        }

        let id = Uuid::new_v4().to_string();
        self.store.write(INSTALLATION_ID_KEY, &id)?;
        tracing::info!(dir = %self.store.dir.display(), "Created installation id");

        match append_ignore_entry(&self.project_dir) {
            Ok(true) => tracing::debug!("Added installation id to {}", IGNORE_FILE),
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "Could not update {}", IGNORE_FILE),
        }

        Ok(id)
    }

    /// Load (or create) the installation id, then advance the counter.
    pub fn load(&self) -> Result<Identity> {
        let installation_id = self.installation_id()?;
        let submission_number = self.next_submission_number()?;
        Ok(Identity {
            installation_id,
            submission_number,
        })
    }

    /// Increment and return the submission counter.
    ///
    /// A missing or unparsable counter counts as 0, so the first call
    /// returns 1. The new value is persisted before it is returned.
    pub fn next_submission_number(&self) -> Result<u64> {
        let previous = self
            .store
            .read(SUBMISSION_COUNT_KEY)?
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(0);
        let next = previous + 1;
        self.store.write(SUBMISSION_COUNT_KEY, &next.to_string())?;
        tracing::debug!(submission_number = next, "Advanced submission counter");
        Ok(next)
    }
}

/// Ignore pattern for the installation id file
pub fn ignore_pattern() -> String {
    format!("{}/{}", STATE_DIR, INSTALLATION_ID_KEY)
}

/// Append the id file to `<project_dir>/.gitignore` if that file exists and
/// does not already mention it.
///
/// Returns whether the file was changed.
pub fn append_ignore_entry(project_dir: &Path) -> io::Result<bool> {
    let ignore_path = project_dir.join(IGNORE_FILE);
    if !ignore_path.is_file() {
        return Ok(false);
    }

    let pattern = ignore_pattern();
    let content = fs::read_to_string(&ignore_path)?;
    if content.contains(&pattern) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(&ignore_path)?;
    write!(file, "\n# CxMS telemetry ID (anonymous)\n{}\n", pattern)?;
    Ok(true)
}
