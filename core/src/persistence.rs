//! Persistence gateway — fail-soft load/save of the single player snapshot.
//!
//! RULE: nothing past this module sees a storage error. A failed load is
//! "no prior state" and a failed save is a log line; play continues on
//! the in-memory snapshot either way.

use crate::{
    clock::to_millis,
    config::GameConfig,
    error::GameResult,
    snapshot::Snapshot,
};
use chrono::{DateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// A place a snapshot can live. Implementations may fail; the gateway
/// absorbs the failure.
pub trait SaveStore: Send {
    /// Short label for log lines.
    fn name(&self) -> &'static str;

    /// The stored payload, or None if nothing was ever saved.
    fn read(&self) -> GameResult<Option<String>>;

    /// Replace the stored snapshot. Last write wins.
    fn write(&self, snapshot: &Snapshot) -> GameResult<()>;
}

pub struct PersistenceGateway {
    store: Box<dyn SaveStore>,
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn SaveStore>) -> Self {
        Self { store }
    }

    /// Load and restore the stored snapshot. Missing, unreadable and
    /// malformed payloads all come back as None.
    pub fn load(&self, config: &GameConfig, now: DateTime<Utc>) -> Option<Snapshot> {
        let payload = match self.store.read() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                log::info!("{}: no saved game", self.store.name());
                return None;
            }
            Err(e) => {
                log::warn!("{}: could not load game: {e}", self.store.name());
                return None;
            }
        };

        match Snapshot::restore(&payload, config, now) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("{}: discarding unreadable save: {e}", self.store.name());
                None
            }
        }
    }

    /// Stamp `last_save_timestamp` and write. Returns false when the write
    /// failed; the stamp stays on the in-memory snapshot either way.
    ///
    /// Instants are cut to milliseconds first so the in-memory snapshot
    /// matches what a later load returns.
    pub fn save(&self, snapshot: &mut Snapshot, now: DateTime<Utc>) -> bool {
        snapshot.last_save_timestamp = to_millis(now);
        snapshot.last_daily_login_timestamp = to_millis(snapshot.last_daily_login_timestamp);
        match self.store.write(snapshot) {
            Ok(()) => {
                log::debug!("{}: saved at {now}", self.store.name());
                true
            }
            Err(e) => {
                log::warn!("{}: could not save game: {e}", self.store.name());
                false
            }
        }
    }
}

// ── In-memory store ───────────────────────────────────────────────

/// Shared in-memory payload. Clones see the same slot, so a test can keep
/// a handle after giving the store to a controller.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `payload`, verbatim.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self { payload: Arc::new(Mutex::new(Some(payload.into()))) }
    }

    pub fn payload(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.payload.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SaveStore for MemoryStore {
    fn name(&self) -> &'static str { "memory" }

    fn read(&self) -> GameResult<Option<String>> {
        Ok(self.payload())
    }

    fn write(&self, snapshot: &Snapshot) -> GameResult<()> {
        let json = serde_json::to_string(snapshot)?;
        *self.lock() = Some(json);
        Ok(())
    }
}

// ── File store ────────────────────────────────────────────────────

/// One JSON file on local disk. Writes go to a sibling temp file that is
/// renamed over the target, so a reader never sees a torn save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SaveStore for FileStore {
    fn name(&self) -> &'static str { "file" }

    fn read(&self) -> GameResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, snapshot: &Snapshot) -> GameResult<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
