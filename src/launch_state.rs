//! Persisted launch flags shared with the rest of the app.
//!
//! Two process-wide flags survive restarts: whether the location permission
//! flow has already run in this install, and whether the first-start dialog
//! has been seen (which is how "first launch" is defined). The splash flow
//! reads and writes them through [`LaunchStore`] but does not own their
//! storage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// On-disk launch flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchState {
    /// The location permission prompt has been shown at least once.
    pub location_requested: bool,
    /// The follow-on screen has been reached at least once.
    pub first_start_dialog_seen: bool,
}

/// Configuration collaborator consulted by the startup orchestrator.
///
/// Calls are synchronous and treated as atomic.
pub trait LaunchStore: Send + Sync {
    fn is_location_requested(&self) -> bool;
    fn set_location_requested(&self);
    fn is_first_launch(&self) -> bool;
    fn set_first_start_dialog_seen(&self);
}

/// In-process launch store, mostly for tests and the simulator.
#[derive(Debug, Default)]
pub struct MemoryLaunchStore {
    state: Mutex<LaunchState>,
}

impl MemoryLaunchStore {
    pub fn new(state: LaunchState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> LaunchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LaunchStore for MemoryLaunchStore {
    fn is_location_requested(&self) -> bool {
        self.snapshot().location_requested
    }

    fn set_location_requested(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .location_requested = true;
    }

    fn is_first_launch(&self) -> bool {
        !self.snapshot().first_start_dialog_seen
    }

    fn set_first_start_dialog_seen(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .first_start_dialog_seen = true;
    }
}

/// Launch store persisted as TOML, written through on every change.
///
/// Write failures are logged and swallowed: losing a flag only means the
/// user may be prompted once more, which never blocks startup.
#[derive(Debug)]
pub struct FileLaunchStore {
    path: PathBuf,
    state: Mutex<LaunchState>,
}

impl FileLaunchStore {
    /// Open the store at `path`. A missing or unreadable file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "ignoring malformed launch state: {e}");
                LaunchState::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LaunchState::default(),
            Err(e) => {
                warn!(path = %path.display(), "cannot read launch state: {e}");
                LaunchState::default()
            }
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Open the store at [`crate::app_dirs::launch_state_file`].
    pub fn open_default() -> Self {
        Self::open(crate::app_dirs::launch_state_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> LaunchState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, apply: impl FnOnce(&mut LaunchState)) {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let before = *guard;
        apply(&mut *guard);
        if *guard == before {
            return;
        }
        if let Err(e) = persist(&self.path, &*guard) {
            warn!(path = %self.path.display(), "cannot persist launch state: {e}");
        } else {
            debug!(path = %self.path.display(), state = ?*guard, "launch state saved");
        }
    }
}

fn persist(path: &Path, state: &LaunchState) -> crate::error::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(state)
        .map_err(|e| crate::error::StartupError::Config(e.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

impl LaunchStore for FileLaunchStore {
    fn is_location_requested(&self) -> bool {
        self.snapshot().location_requested
    }

    fn set_location_requested(&self) {
        self.update(|s| s.location_requested = true);
    }

    fn is_first_launch(&self) -> bool {
        !self.snapshot().first_start_dialog_seen
    }

    fn set_first_start_dialog_seen(&self) {
        self.update(|s| s.first_start_dialog_seen = true);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn fresh_install_is_first_launch() {
        let store = MemoryLaunchStore::default();
        assert!(store.is_first_launch());
        assert!(!store.is_location_requested());
    }

    #[test]
    fn memory_store_records_flags() {
        let store = MemoryLaunchStore::default();
        store.set_location_requested();
        store.set_first_start_dialog_seen();
        assert!(store.is_location_requested());
        assert!(!store.is_first_launch());
    }

    #[test]
    fn file_store_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileLaunchStore::open(dir.path().join("launch_state.toml"));
        assert_eq!(store.snapshot(), LaunchState::default());
        assert!(!store.path().exists(), "reading must not create the file");
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("state").join("launch_state.toml");

        let store = FileLaunchStore::open(&path);
        store.set_location_requested();
        drop(store);

        let reopened = FileLaunchStore::open(&path);
        assert!(reopened.is_location_requested());
        assert!(reopened.is_first_launch());
    }

    #[test]
    fn file_store_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("launch_state.toml");
        std::fs::write(&path, "location_requested = 7").unwrap();

        let store = FileLaunchStore::open(&path);
        assert_eq!(store.snapshot(), LaunchState::default());
    }
}
