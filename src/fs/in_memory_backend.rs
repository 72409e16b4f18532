//! In-Memory Backend
//!
//! A pure in-memory storage backend with an optional byte quota, used for
//! simulated devices and tests.

use std::collections::HashMap;

use super::backend::{child_path, dirname, StorageBackend};
use super::types::{BackendError, EntryKind};

#[derive(Debug, Clone)]
enum MemEntry {
    File { content: Vec<u8> },
    Directory,
}

/// In-memory storage keyed by volume-internal path.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    data: HashMap<String, MemEntry>,
    capacity: Option<u64>,
    read_only: bool,
}

impl InMemoryBackend {
    /// Create an empty, unbounded backend.
    pub fn new() -> Self {
        let mut data = HashMap::new();
        data.insert("/".to_string(), MemEntry::Directory);
        Self { data, capacity: None, read_only: false }
    }

    /// Create an empty backend holding at most `bytes` of file content.
    pub fn with_capacity(bytes: u64) -> Self {
        Self { capacity: Some(bytes), ..Self::new() }
    }

    /// Create with initial files; missing parent directories are created.
    pub fn with_files<P: AsRef<str>, C: AsRef<[u8]>>(files: &[(P, C)]) -> Self {
        let mut backend = Self::new();
        for (path, content) in files {
            backend.seed_file(path.as_ref(), content.as_ref());
        }
        backend
    }

    /// Mark the medium read-only; later writes fail.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Insert a file during setup, bypassing quota and read-only checks.
    pub fn seed_file(&mut self, path: &str, content: &[u8]) {
        let normalized = normalize_path(path);
        self.ensure_parent_dirs(&normalized);
        self.data.insert(normalized, MemEntry::File { content: content.to_vec() });
    }

    /// Insert a directory (and its parents) during setup.
    pub fn seed_dir(&mut self, path: &str) {
        let normalized = normalize_path(path);
        self.ensure_parent_dirs(&normalized);
        self.data.entry(normalized).or_insert(MemEntry::Directory);
    }

    fn ensure_parent_dirs(&mut self, path: &str) {
        let dir = dirname(path);
        if dir == "/" {
            return;
        }
        if !self.data.contains_key(&dir) {
            self.ensure_parent_dirs(&dir);
            self.data.insert(dir, MemEntry::Directory);
        }
    }

    fn check_writable(&self) -> Result<(), BackendError> {
        if self.read_only {
            Err(BackendError::ReadOnly)
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

impl StorageBackend for InMemoryBackend {
    fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        match self.data.get(path) {
            Some(MemEntry::File { .. }) => Some(EntryKind::File),
            Some(MemEntry::Directory) => Some(EntryKind::Directory),
            None => None,
        }
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        match self.data.get(path) {
            Some(MemEntry::File { content }) => Ok(content.clone()),
            _ => Err(BackendError::NotFound(path.to_string())),
        }
    }

    fn write(&mut self, path: &str, content: &[u8]) -> Result<(), BackendError> {
        self.check_writable()?;
        if let Some(capacity) = self.capacity {
            let existing = self.size(path).unwrap_or(0);
            let available = capacity.saturating_sub(self.used() - existing);
            let needed = content.len() as u64;
            if needed > available {
                return Err(BackendError::QuotaExceeded { needed, available });
            }
        }
        self.data.insert(path.to_string(), MemEntry::File { content: content.to_vec() });
        Ok(())
    }

    fn create_dir(&mut self, path: &str) -> Result<(), BackendError> {
        self.check_writable()?;
        self.data.insert(path.to_string(), MemEntry::Directory);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), BackendError> {
        self.check_writable()?;
        match self.data.get(path) {
            None => Err(BackendError::NotFound(path.to_string())),
            Some(MemEntry::Directory) if !self.children(path)?.is_empty() => {
                Err(BackendError::NotEmpty(path.to_string()))
            }
            Some(_) => {
                self.data.remove(path);
                Ok(())
            }
        }
    }

    fn children(&self, path: &str) -> Result<Vec<String>, BackendError> {
        match self.data.get(path) {
            Some(MemEntry::Directory) => {}
            Some(MemEntry::File { .. }) => return Err(BackendError::NotDirectory(path.to_string())),
            None => return Err(BackendError::NotFound(path.to_string())),
        }

        let mut names: Vec<String> = self
            .data
            .keys()
            .filter(|key| key.as_str() != path && dirname(key) == path)
            .filter_map(|key| key.rsplit('/').next().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn size(&self, path: &str) -> Option<u64> {
        match self.data.get(path) {
            Some(MemEntry::File { content }) => Some(content.len() as u64),
            _ => None,
        }
    }

    fn used(&self) -> u64 {
        self.data
            .values()
            .map(|entry| match entry {
                MemEntry::File { content } => content.len() as u64,
                MemEntry::Directory => 0,
            })
            .sum()
    }

    fn capacity(&self) -> Option<u64> {
        self.capacity
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/foo/bar/"), "/foo/bar");
        assert_eq!(normalize_path("foo/bar"), "/foo/bar");
    }

    #[test]
    fn test_with_files_creates_parents() {
        let backend = InMemoryBackend::with_files(&[("/a/b/c.txt", "data")]);
        assert_eq!(backend.entry_kind("/a"), Some(EntryKind::Directory));
        assert_eq!(backend.entry_kind("/a/b"), Some(EntryKind::Directory));
        assert_eq!(backend.entry_kind("/a/b/c.txt"), Some(EntryKind::File));
        assert_eq!(backend.read("/a/b/c.txt").unwrap(), b"data");
    }

    #[test]
    fn test_children_sorted_and_direct_only() {
        let backend = InMemoryBackend::with_files(&[
            ("/d/zeta", "z"),
            ("/d/alpha", "a"),
            ("/d/sub/deep", "x"),
            ("/other", "o"),
        ]);
        assert_eq!(backend.children("/d").unwrap(), vec!["alpha", "sub", "zeta"]);
        assert_eq!(backend.children("/").unwrap(), vec!["d", "other"]);
        assert!(matches!(backend.children("/other"), Err(BackendError::NotDirectory(_))));
        assert!(matches!(backend.children("/missing"), Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_quota() {
        let mut backend = InMemoryBackend::with_capacity(10);
        backend.write("/a", b"12345").unwrap();
        backend.write("/a", b"1234567890").unwrap();
        let err = backend.write("/b", b"x").unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded { needed: 1, available: 0 }));
        assert_eq!(backend.used(), 10);
    }

    #[test]
    fn test_read_only() {
        let mut backend = InMemoryBackend::with_files(&[("/a", "x")]).read_only();
        assert!(backend.is_read_only());
        assert!(matches!(backend.write("/b", b"y"), Err(BackendError::ReadOnly)));
        assert!(matches!(backend.remove("/a"), Err(BackendError::ReadOnly)));
        assert_eq!(backend.read("/a").unwrap(), b"x");
    }

    #[test]
    fn test_remove_refuses_non_empty_directory() {
        let mut backend = InMemoryBackend::with_files(&[("/d/f", "x")]);
        assert!(matches!(backend.remove("/d"), Err(BackendError::NotEmpty(_))));
        backend.remove("/d/f").unwrap();
        backend.remove("/d").unwrap();
        assert_eq!(backend.entry_kind("/d"), None);
    }
}
