//! Local key-value stores backing the seen-bookings set and the session flag.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::Mutex,
};

use tracing::warn;

use crate::{errors::Error, ports::KeyValueStore, Result};

type Map = BTreeMap<String, String>;

/// JSON object file (`{"key": "value", ...}`), rewritten atomically on every change.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<Map> {
        let txt = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(Error::Io(e)),
        };
        if txt.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Map>(&txt) {
            Ok(m) => Ok(m),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file is corrupt, starting empty");
                Ok(Map::new())
            }
        }
    }

    fn write_map(&self, map: &Map) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let file_name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::InvalidPath {
                path: self.path.clone(),
                reason: "state file path has no file name".to_string(),
            })?;
        let tmp = self.path.with_file_name(format!(".{file_name}.tmp"));

        let txt = serde_json::to_string_pretty(map)?;
        fs::write(&tmp, txt)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut Map) -> bool) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::External("state file lock poisoned".to_string()))?;
        let mut map = self.read_map()?;
        if f(&mut map) {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::External("state file lock poisoned".to_string()))?;
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|m| {
            m.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.modify(|m| m.remove(key).is_some())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Map>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut m) = store.inner.lock() {
            m.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let m = self
            .inner
            .lock()
            .map_err(|_| Error::External("memory store lock poisoned".to_string()))?;
        Ok(m.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut m = self
            .inner
            .lock()
            .map_err(|_| Error::External("memory store lock poisoned".to_string()))?;
        m.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut m = self
            .inner
            .lock()
            .map_err(|_| Error::External("memory store lock poisoned".to_string()))?;
        m.remove(key);
        Ok(())
    }
}
