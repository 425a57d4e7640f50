//! Storage writers for dumped manifests
//!
//! A writer persists one named blob per call. Missing parent directories are
//! created on demand and existing entries are overwritten.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persist a named blob
#[cfg_attr(test, mockall::automock)]
pub trait StorageWriter: Send + Sync {
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;
}

/// Writes each entry to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriter;

impl FileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl StorageWriter for FileWriter {
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}

/// Keeps every entry in memory, keyed by path
#[derive(Debug, Default)]
pub struct MemoryWriter {
    entries: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All written paths in sorted order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Content written at `path`, as UTF-8 text
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let content = entries.get(path.as_ref())?;
        String::from_utf8(content.clone()).ok()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageWriter for MemoryWriter {
    fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::other("memory writer lock poisoned"))?;
        entries.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }
}

/// Remove `dir` and recreate it empty
pub fn clear_dir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::create_dir_all(dir)
}
