//! File access for the sync pipeline
//!
//! Every read and write goes through [`FileStore`] so the pipeline can run
//! against an in-memory tree in tests.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

pub trait FileStore {
    /// Read a whole file. `Ok(None)` when the file does not exist.
    fn read(&self, path: &Path) -> Result<Option<String>>;

    /// Replace the whole file with `contents`
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;

    /// Read a file that must exist
    fn read_required(&self, path: &Path) -> Result<String> {
        self.read(path)?
            .with_context(|| format!("File not found: {}", path.display()))
    }
}

/// Store backed by the real filesystem
#[derive(Debug, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
        Ok(())
    }
}

/// Store holding files in memory, keyed by path
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: std::collections::BTreeMap<std::path::PathBuf, String>,
    writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<std::path::PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Number of writes performed since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl FileStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore;
        assert_eq!(store.read(&dir.path().join("absent.json")).unwrap(), None);
    }

    #[test]
    fn test_disk_store_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("scopeMappings.json");
        let mut store = DiskStore;

        store.write(&path, "[]\n").unwrap();
        assert_eq!(store.read(&path).unwrap().as_deref(), Some("[]\n"));
    }

    #[test]
    fn test_read_required_reports_path() {
        let store = MemoryStore::new();
        let err = store.read_required(Path::new("package.json")).unwrap_err();
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        store.insert("a.json", "{}");
        store.write(Path::new("a.json"), "{ }").unwrap();
        assert_eq!(store.get(Path::new("a.json")), Some("{ }"));
        assert_eq!(store.write_count(), 1);
    }
}
