//! Single-byte power-state persistence.
//!
//! The durable representation is exactly one byte (1 = On, 0 = Off), read
//! once at startup and written on every power transition. Writes are
//! best-effort: a failed save is logged by the dispatcher and never rolls
//! back the in-memory state.

use crate::device::state::PowerState;
use crate::error::{LumenError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Trait for the durable power-state byte.
///
/// This trait allows swapping implementations (file-backed vs mock).
pub trait StateStore: Send {
    /// Read the persisted state, if any.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<PowerState>>;

    /// Persist the given state.
    fn save(&mut self, power: PowerState) -> Result<()>;
}

/// File-backed store holding the single state byte.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the given path. The file is created on the
    /// first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<PowerState>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes.first().map(|&b| PowerState::from_byte(b))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LumenError::Persistence {
                message: format!("read {}: {}", self.path.display(), e),
            }),
        }
    }

    fn save(&mut self, power: PowerState) -> Result<()> {
        fs::write(&self.path, [power.to_byte()]).map_err(|e| LumenError::Persistence {
            message: format!("write {}: {}", self.path.display(), e),
        })
    }
}

/// In-memory store for tests, with failure injection and a save recorder.
#[derive(Debug, Clone, Default)]
pub struct MockStateStore {
    state: Arc<Mutex<Option<PowerState>>>,
    saves: Arc<Mutex<Vec<PowerState>>>,
    fail_load: bool,
    fail_save: bool,
}

impl MockStateStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load the store with a persisted state, as if written on a
    /// previous boot.
    pub fn with_state(self, power: PowerState) -> Self {
        *self.state.lock().unwrap() = Some(power);
        self
    }

    /// Configure the mock to fail on load.
    pub fn with_load_failure(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Configure the mock to fail on save.
    pub fn with_save_failure(mut self) -> Self {
        self.fail_save = true;
        self
    }

    /// Every save attempted so far, in order. Failed saves are not recorded.
    pub fn saves(&self) -> Vec<PowerState> {
        self.saves.lock().unwrap().clone()
    }

    /// The currently persisted state.
    pub fn persisted(&self) -> Option<PowerState> {
        *self.state.lock().unwrap()
    }
}

impl StateStore for MockStateStore {
    fn load(&self) -> Result<Option<PowerState>> {
        if self.fail_load {
            return Err(LumenError::Persistence {
                message: "mock load failure".to_string(),
            });
        }
        Ok(*self.state.lock().unwrap())
    }

    fn save(&mut self, power: PowerState) -> Result<()> {
        if self.fail_save {
            return Err(LumenError::Persistence {
                message: "mock save failure".to_string(),
            });
        }
        *self.state.lock().unwrap() = Some(power);
        self.saves.lock().unwrap().push(power);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_single_byte() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lumen.state");
        let mut store = FileStateStore::new(&path);

        assert_eq!(store.load().unwrap(), None);

        store.save(PowerState::On).unwrap();
        assert_eq!(store.load().unwrap(), Some(PowerState::On));
        assert_eq!(fs::read(&path).unwrap(), vec![1u8]);

        store.save(PowerState::Off).unwrap();
        assert_eq!(store.load().unwrap(), Some(PowerState::Off));
        assert_eq!(fs::read(&path).unwrap(), vec![0u8]);
    }

    #[test]
    fn file_store_missing_file_is_none_not_error() {
        let dir = tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("absent"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_reads_foreign_bytes_as_off() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lumen.state");
        fs::write(&path, [7u8]).unwrap();

        let store = FileStateStore::new(&path);
        assert_eq!(store.load().unwrap(), Some(PowerState::Off));
    }

    #[test]
    fn mock_store_records_saves() {
        let mut store = MockStateStore::new();
        let probe = store.clone();

        store.save(PowerState::On).unwrap();
        store.save(PowerState::On).unwrap();
        store.save(PowerState::Off).unwrap();

        assert_eq!(
            probe.saves(),
            vec![PowerState::On, PowerState::On, PowerState::Off]
        );
        assert_eq!(probe.persisted(), Some(PowerState::Off));
    }

    #[test]
    fn mock_store_failure_injection() {
        let mut store = MockStateStore::new().with_save_failure();
        assert!(store.save(PowerState::On).is_err());
        assert!(store.saves().is_empty());

        let store = MockStateStore::new().with_load_failure();
        assert!(store.load().is_err());
    }
}
