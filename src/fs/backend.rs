//! Storage Backend
//!
//! The byte-storage contract a volume is built on. Paths are volume-internal
//! strings such as `/` or `/dir/file.txt`. Backends store and enumerate; the
//! item rules (parents must exist, no file/directory clashes) live in
//! [`Volume`](super::Volume).

use super::types::{BackendError, EntryKind};

pub trait StorageBackend {
    /// Kind of the entry at `path`, `None` when absent.
    fn entry_kind(&self, path: &str) -> Option<EntryKind>;

    /// Full content of a file.
    fn read(&self, path: &str) -> Result<Vec<u8>, BackendError>;

    /// Create or replace a file. The parent directory exists.
    fn write(&mut self, path: &str, content: &[u8]) -> Result<(), BackendError>;

    /// Create one directory. The parent directory exists.
    fn create_dir(&mut self, path: &str) -> Result<(), BackendError>;

    /// Remove one file or one empty directory.
    fn remove(&mut self, path: &str) -> Result<(), BackendError>;

    /// Names of the direct children of a directory, sorted.
    fn children(&self, path: &str) -> Result<Vec<String>, BackendError>;

    /// Size of a file in bytes.
    fn size(&self, path: &str) -> Option<u64>;

    /// Bytes used by file contents.
    fn used(&self) -> u64;

    /// Total capacity in bytes, `None` when unbounded.
    fn capacity(&self) -> Option<u64> {
        None
    }

    fn is_read_only(&self) -> bool {
        false
    }
}

/// Join a child name onto a volume-internal directory path.
pub fn child_path(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent of a volume-internal path.
pub fn dirname(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(pos) => path[..pos].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
    }

    #[test]
    fn test_dirname_fn() {
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("/foo/bar"), "/foo");
        assert_eq!(dirname("/foo/bar/baz"), "/foo/bar");
    }
}
