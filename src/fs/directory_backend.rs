//! Directory Backend
//!
//! Exposes a host directory as a volume. Volume paths map onto paths below
//! the root directory; segments are already free of `.`/`..` by the time
//! they reach a backend.

use std::fs;
use std::path::{Path, PathBuf};

use super::backend::StorageBackend;
use super::types::{BackendError, EntryKind};

/// Storage backed by a directory on the host file system.
#[derive(Debug, Clone)]
pub struct DirectoryBackend {
    root: PathBuf,
    capacity: Option<u64>,
    read_only: bool,
}

impl DirectoryBackend {
    /// Open `root`, creating it when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, capacity: None, read_only: false })
    }

    pub fn with_capacity(mut self, bytes: u64) -> Self {
        self.capacity = Some(bytes);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> PathBuf {
        let mut host = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            host.push(segment);
        }
        host
    }

    fn check_writable(&self) -> Result<(), BackendError> {
        if self.read_only {
            Err(BackendError::ReadOnly)
        } else {
            Ok(())
        }
    }
}

fn used_below(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| match entry.metadata() {
            Ok(meta) if meta.is_dir() => used_below(&entry.path()),
            Ok(meta) => meta.len(),
            Err(_) => 0,
        })
        .sum()
}

impl StorageBackend for DirectoryBackend {
    fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        let meta = fs::metadata(self.host_path(path)).ok()?;
        if meta.is_dir() {
            Some(EntryKind::Directory)
        } else {
            Some(EntryKind::File)
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        Ok(fs::read(self.host_path(path))?)
    }

    fn write(&mut self, path: &str, content: &[u8]) -> Result<(), BackendError> {
        self.check_writable()?;
        if let Some(capacity) = self.capacity {
            let existing = self.size(path).unwrap_or(0);
            let available = capacity.saturating_sub(self.used().saturating_sub(existing));
            let needed = content.len() as u64;
            if needed > available {
                return Err(BackendError::QuotaExceeded { needed, available });
            }
        }
        fs::write(self.host_path(path), content)?;
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> Result<(), BackendError> {
        self.check_writable()?;
        fs::create_dir(self.host_path(path))?;
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), BackendError> {
        self.check_writable()?;
        let host = self.host_path(path);
        match self.entry_kind(path) {
            Some(EntryKind::Directory) => fs::remove_dir(host)?,
            Some(EntryKind::File) => fs::remove_file(host)?,
            None => return Err(BackendError::NotFound(path.to_string())),
        }
        Ok(())
    }

    fn children(&self, path: &str) -> Result<Vec<String>, BackendError> {
        match self.entry_kind(path) {
            Some(EntryKind::Directory) => {}
            Some(EntryKind::File) => return Err(BackendError::NotDirectory(path.to_string())),
            None => return Err(BackendError::NotFound(path.to_string())),
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(self.host_path(path))? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn size(&self, path: &str) -> Option<u64> {
        let meta = fs::metadata(self.host_path(path)).ok()?;
        if meta.is_file() {
            Some(meta.len())
        } else {
            None
        }
    }

    fn used(&self) -> u64 {
        used_below(&self.root)
    }

    fn capacity(&self) -> Option<u64> {
        self.capacity
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
