// ABOUTME: Persisted window geometry records and the debounced snapshot store.
// ABOUTME: One JSON document maps window identity to its last known state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex as PLMutex;
use serde::{Deserialize, Serialize};

use crate::diagnostics;
use crate::error::{StorageError, StorageResult};

pub const SCHEMA_VERSION: u32 = 1;

/// Quiescence window for coalescing rapid state changes into one write.
pub const SAVE_DEBOUNCE_MS: u64 = 500;

const STATE_FILE: &str = "windows.json";

/// Last known outer bounds of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Persisted state for one window identity. Records are written on every
/// resize-class event (debounced) and read back at startup; they are never
/// pruned, so identities that are never recreated simply go unused.
///
/// Example:
/// ```rust,ignore
/// let state = WindowState {
///     id: "jira-acme-atlassian-net-jira".to_string(),
///     product_id: "jira".to_string(),
///     url: "https://acme.atlassian.net/jira/projects".to_string(),
///     bounds: WindowBounds { x: 100, y: 100, width: 1200, height: 900 },
///     is_maximized: false,
///     is_minimized: false,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub id: String,
    pub product_id: String,
    pub url: String,
    pub bounds: WindowBounds,
    pub is_maximized: bool,
    pub is_minimized: bool,
}

/// Complete persisted document: identity -> state, rewritten in full on every
/// flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStateSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub windows: BTreeMap<String, WindowState>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for WindowStateSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            windows: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowStateStore {
    root: PathBuf,
}

impl WindowStateStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn load(&self) -> StorageResult<WindowStateSnapshot> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(WindowStateSnapshot::default());
        }
        let data =
            fs::read_to_string(&path).map_err(|e| StorageError::ReadError(e.to_string()))?;
        let mut snapshot = match serde_json::from_str::<WindowStateSnapshot>(&data) {
            Ok(s) => s,
            Err(parse_err) => {
                if let Some(backup) = self.load_from_backup() {
                    return self.migrate(backup);
                }
                return Err(StorageError::ParseError(parse_err.to_string()));
            }
        };
        snapshot = self.migrate(snapshot)?;
        Ok(snapshot)
    }

    fn load_from_backup(&self) -> Option<WindowStateSnapshot> {
        let backup_path = self.file_path().with_extension("json.bak");
        if !backup_path.exists() {
            return None;
        }
        let data = fs::read_to_string(&backup_path).ok()?;
        serde_json::from_str::<WindowStateSnapshot>(&data).ok()
    }

    fn migrate(&self, mut snapshot: WindowStateSnapshot) -> StorageResult<WindowStateSnapshot> {
        if snapshot.schema_version < SCHEMA_VERSION {
            snapshot.schema_version = SCHEMA_VERSION;
        }
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &WindowStateSnapshot) -> StorageResult<()> {
        let path = self.file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteError(e.to_string()))?;
        }
        self.rotate_backups(&path);
        let payload = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, payload.as_bytes())
            .map_err(|e| StorageError::WriteError(e.to_string()))?;
        fs::rename(&tmp_path, &path).map_err(|e| StorageError::WriteError(e.to_string()))?;
        Ok(())
    }

    fn rotate_backups(&self, path: &Path) {
        if !path.exists() {
            return;
        }

        let bak2 = path.with_extension("json.bak.2");
        let bak1 = path.with_extension("json.bak.1");
        let bak = path.with_extension("json.bak");

        if let Err(e) = fs::remove_file(&bak2) {
            if e.kind() != std::io::ErrorKind::NotFound {
                diagnostics::log(format!("window_backup_warning: remove bak2 failed: {}", e));
            }
        }

        if bak1.exists() {
            if let Err(e) = fs::rename(&bak1, &bak2) {
                diagnostics::log(format!(
                    "window_backup_warning: rotate bak1->bak2 failed: {}",
                    e
                ));
            }
        }

        if bak.exists() {
            if let Err(e) = fs::rename(&bak, &bak1) {
                diagnostics::log(format!(
                    "window_backup_warning: rotate bak->bak1 failed: {}",
                    e
                ));
            }
        }

        if let Err(e) = fs::rename(path, &bak) {
            diagnostics::log(format!("window_backup_warning: create backup failed: {}", e));
        }
    }

    fn file_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }
}

pub fn default_storage_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| Path::new("/").to_path_buf())
        .join(".atlas-desktop")
}

enum SaveMessage {
    Save,
    Shutdown,
}

/// Debounced store wrapper: rapid saves collapse to one durable write of the
/// latest snapshot after [`SAVE_DEBOUNCE_MS`] of quiescence. New saves
/// cancel-and-replace the pending one rather than queuing, so writes for a
/// given identity always land in event order, latest state wins.
///
/// Example:
/// ```rust,ignore
/// let store = WindowStateStore::new(default_storage_root());
/// let debounced = DebouncedStateStore::new(store, SAVE_DEBOUNCE_MS);
/// debounced.save(&snapshot)?;
/// debounced.flush()?; // orderly shutdown
/// ```
pub struct DebouncedStateStore {
    store: WindowStateStore,
    sender: Sender<SaveMessage>,
    pending: Arc<PLMutex<Option<WindowStateSnapshot>>>,
    worker: Option<JoinHandle<()>>,
}

impl DebouncedStateStore {
    pub fn new(store: WindowStateStore, debounce_ms: u64) -> Self {
        let (sender, receiver) = mpsc::channel();
        let pending: Arc<PLMutex<Option<WindowStateSnapshot>>> = Arc::new(PLMutex::new(None));
        let pending_clone = pending.clone();
        let store_clone = store.clone();
        let debounce = Duration::from_millis(debounce_ms);

        let worker = thread::spawn(move || {
            Self::worker_loop(receiver, store_clone, pending_clone, debounce);
        });

        Self {
            store,
            sender,
            pending,
            worker: Some(worker),
        }
    }

    /// Queues a save; the write lands after the quiescence window.
    pub fn save(&self, snapshot: &WindowStateSnapshot) -> StorageResult<()> {
        *self.pending.lock() = Some(snapshot.clone());
        let _ = self.sender.send(SaveMessage::Save);
        Ok(())
    }

    pub fn load(&self) -> StorageResult<WindowStateSnapshot> {
        self.store.load()
    }

    /// Forces any pending write synchronously and leaves nothing scheduled;
    /// the quiescence timer finds an empty pending slot and stays silent.
    pub fn flush(&self) -> StorageResult<()> {
        if let Some(snapshot) = self.pending.lock().take() {
            self.store.save(&snapshot)?;
        }
        Ok(())
    }

    fn worker_loop(
        receiver: Receiver<SaveMessage>,
        store: WindowStateStore,
        pending: Arc<PLMutex<Option<WindowStateSnapshot>>>,
        debounce: Duration,
    ) {
        let mut last_request: Option<Instant> = None;

        loop {
            let timeout = if last_request.is_some() {
                debounce
            } else {
                Duration::from_secs(60)
            };

            match receiver.recv_timeout(timeout) {
                Ok(SaveMessage::Save) => {
                    last_request = Some(Instant::now());
                }
                Ok(SaveMessage::Shutdown) => {
                    if let Some(snap) = pending.lock().take() {
                        let _ = store.save(&snap);
                    }
                    break;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if let Some(t) = last_request {
                        if t.elapsed() >= debounce {
                            if let Some(snap) = pending.lock().take() {
                                if let Err(e) = store.save(&snap) {
                                    diagnostics::log(format!("window_debounced_save_error: {}", e));
                                }
                            }
                            last_request = None;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl Drop for DebouncedStateStore {
    fn drop(&mut self) {
        let _ = self.sender.send(SaveMessage::Shutdown);
        if let Some(snap) = self.pending.lock().take() {
            let _ = self.store.save(&snap);
        }
        if let Some(w) = self.worker.take() {
            let _ = w.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state(identity: &str, width: u32) -> WindowState {
        WindowState {
            id: identity.to_string(),
            product_id: "jira".to_string(),
            url: "https://acme.atlassian.net/jira/projects".to_string(),
            bounds: WindowBounds {
                x: 120,
                y: 80,
                width,
                height: 900,
            },
            is_maximized: false,
            is_minimized: false,
        }
    }

    fn snapshot_with(state: WindowState) -> WindowStateSnapshot {
        let mut snapshot = WindowStateSnapshot::default();
        snapshot.windows.insert(state.id.clone(), state);
        snapshot
    }

    #[test]
    fn test_load_missing_file_yields_empty_snapshot() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
        assert!(snapshot.windows.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip_is_bit_identical() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());

        let mut state = sample_state("jira-acme-atlassian-net-jira", 1440);
        state.is_maximized = true;
        let snapshot = snapshot_with(state.clone());

        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap();

        let restored = loaded.windows.get("jira-acme-atlassian-net-jira").unwrap();
        assert_eq!(restored, &state, "bounds and flags must survive a restart");
    }

    #[test]
    fn test_backup_rotation_keeps_three_generations() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());

        for i in 0..4 {
            store
                .save(&snapshot_with(sample_state("w", 800 + i)))
                .unwrap();
        }

        let path = store.file_path();
        assert!(path.exists());
        assert!(path.with_extension("json.bak").exists());
        assert!(path.with_extension("json.bak.1").exists());
        assert!(path.with_extension("json.bak.2").exists());
    }

    #[test]
    fn test_load_recovers_from_backup_on_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());

        let snapshot = snapshot_with(sample_state("w", 1024));
        store.save(&snapshot).unwrap();
        store.save(&snapshot).unwrap();

        fs::write(store.file_path(), "invalid json").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.windows.get("w").unwrap().bounds.width, 1024);
    }

    #[test]
    fn test_rapid_saves_coalesce_to_final_state() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());
        let reader = store.clone();
        let debounced = DebouncedStateStore::new(store, 150);

        for i in 0..10 {
            debounced
                .save(&snapshot_with(sample_state("w", 800 + i)))
                .unwrap();
        }
        // Nothing durable until the quiescence window elapses.
        assert!(reader.load().unwrap().windows.is_empty());

        thread::sleep(Duration::from_millis(400));
        let loaded = reader.load().unwrap();
        assert_eq!(
            loaded.windows.get("w").unwrap().bounds.width,
            809,
            "one write reflecting the final bounds"
        );
    }

    #[test]
    fn test_flush_writes_pending_and_cancels_timer() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());
        let reader = store.clone();
        let debounced = DebouncedStateStore::new(store, 150);

        debounced
            .save(&snapshot_with(sample_state("w", 1333)))
            .unwrap();
        debounced.flush().unwrap();

        assert_eq!(reader.load().unwrap().windows.get("w").unwrap().bounds.width, 1333);

        // Overwrite the file, then wait past the debounce window: the flushed
        // timer must not fire a redundant write on top of it.
        let replacement = snapshot_with(sample_state("w", 555));
        reader.save(&replacement).unwrap();
        thread::sleep(Duration::from_millis(400));
        assert_eq!(
            reader.load().unwrap().windows.get("w").unwrap().bounds.width,
            555,
            "no redundant write after an explicit flush"
        );
    }

    #[test]
    fn test_drop_flushes_pending_save() {
        let temp = TempDir::new().unwrap();
        let store = WindowStateStore::new(temp.path().to_path_buf());
        let reader = store.clone();

        {
            let debounced = DebouncedStateStore::new(store, 10_000);
            debounced
                .save(&snapshot_with(sample_state("w", 901)))
                .unwrap();
        }

        assert_eq!(reader.load().unwrap().windows.get("w").unwrap().bounds.width, 901);
    }
}
