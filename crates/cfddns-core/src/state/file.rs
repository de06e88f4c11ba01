// # File State Store
//
// File-based implementation of StateStore.
//
// ## Purpose
//
// Persists the installation's state record between scheduled runs. Each
// run loads it once and saves it at most once.
//
// ## Atomic Writes
//
// - The new record is written to a temporary file in the same directory
// - The temporary file is restricted to the owner, flushed and synced
// - It is then renamed over the destination
// - If any step fails the temporary file is dropped and removed; the
//   previous record is left untouched
//
// ## No Recovery
//
// A missing or unreadable record is reported, never replaced with
// defaults: the operator has to run setup again.

use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

use crate::Error;
use crate::config::UpdaterConfig;
use crate::state::State;
use crate::traits::state_store::StateStore;

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use cfddns_core::state::FileStateStore;
/// use cfddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/home/me/.config/cloudflare_ddns_updater/cf_updater_config.json");
///
///     let mut state = store.load().await?;
///     state.reset_if_due();
///     store.save(&state).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store for the record at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store for the configured state path
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(&config.state_path)
    }

    /// Location of the record
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `contents` to `path` through a temporary sibling file
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        Error::state_store(format!(
            "Failed to create temp file in {}: {}",
            dir.display(),
            e
        ))
    })?;

    restrict_to_owner(temp.as_file()).map_err(|e| {
        Error::state_store(format!(
            "Failed to restrict permissions on {}: {}",
            temp.path().display(),
            e
        ))
    })?;

    temp.write_all(contents)
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| {
            Error::state_store(format!(
                "Failed to write temp file {}: {}",
                temp.path().display(),
                e
            ))
        })?;

    temp.persist(path).map_err(|e| {
        Error::state_store(format!(
            "Failed to replace {}: {}",
            path.display(),
            e.error
        ))
    })?;

    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(file: &std::fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &std::fs::File) -> io::Result<()> {
    Ok(())
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<State, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::config_missing(format!(
                    "no state file at {}",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(Error::config_corrupt(format!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let state = State::from_json(&content).map_err(|e| match e {
            Error::ConfigCorrupt(reason) => {
                Error::config_corrupt(format!("{}: {}", self.path.display(), reason))
            }
            other => other,
        })?;

        tracing::debug!("Loaded state from {}", self.path.display());
        Ok(state)
    }

    async fn save(&self, state: &State) -> Result<(), Error> {
        let json = state.to_json()?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, json.as_bytes()))
            .await
            .map_err(|e| Error::state_store(format!("State writer task failed: {}", e)))??;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }
}
