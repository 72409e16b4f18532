//! Volume
//!
//! One named storage backend plus the item rules: parents are never created
//! implicitly, a file never replaces a directory, deletes are recursive.
//! `save` and `delete` report ordinary failure as `false`; everything else
//! returns a [`VolumeError`].

use std::fmt;

use super::backend::{child_path, StorageBackend};
use super::in_memory_backend::InMemoryBackend;
use super::types::*;
use crate::path::VolumePath;

pub struct Volume {
    name: String,
    backend: Box<dyn StorageBackend>,
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("name", &self.name)
            .field("capacity", &self.capacity())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl Volume {
    pub fn new(name: impl Into<String>, backend: impl StorageBackend + 'static) -> Self {
        Self { name: name.into(), backend: Box::new(backend) }
    }

    /// An empty, unbounded in-memory volume.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(name, InMemoryBackend::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> Option<u64> {
        self.backend.capacity()
    }

    pub fn used(&self) -> u64 {
        self.backend.used()
    }

    /// Remaining bytes, `None` when unbounded.
    pub fn free_space(&self) -> Option<u64> {
        self.capacity().map(|capacity| capacity.saturating_sub(self.used()))
    }

    pub fn is_read_only(&self) -> bool {
        self.backend.is_read_only()
    }

    /// Look up the item at `path`. Absence is not an error.
    pub fn open(&self, path: &VolumePath) -> Option<VolumeItem> {
        let key = path.volume_path_string();
        match self.backend.entry_kind(&key)? {
            EntryKind::File => {
                let size = self.backend.size(&key).unwrap_or(0);
                Some(VolumeItem::File(VolumeFile::new(path.clone(), size)))
            }
            EntryKind::Directory => Some(VolumeItem::Directory(VolumeDirectory::new(path.clone()))),
        }
    }

    pub fn exists(&self, path: &VolumePath) -> bool {
        self.backend.entry_kind(&path.volume_path_string()).is_some()
    }

    /// Create an empty file, truncating an existing one.
    pub fn create_file(&mut self, path: &VolumePath) -> Result<VolumeFile, VolumeError> {
        const OP: &str = "create";
        if path.is_root() {
            return Err(VolumeError::conflict(path, OP, "the volume root is a directory"));
        }
        if let Some(VolumeItem::Directory(_)) = self.open(path) {
            return Err(VolumeError::conflict(path, OP, "a directory already exists at this path"));
        }
        self.check_parent(path, OP)?;

        self.backend
            .write(&path.volume_path_string(), &[])
            .map_err(|e| VolumeError::storage(path, OP, e))?;
        tracing::debug!(volume = %self.name, %path, "created file");
        Ok(VolumeFile::new(path.clone(), 0))
    }

    /// Create one directory; parents must already exist.
    pub fn create_directory(&mut self, path: &VolumePath) -> Result<VolumeDirectory, VolumeError> {
        const OP: &str = "createdir";
        match self.open(path) {
            Some(VolumeItem::File(_)) => {
                return Err(VolumeError::conflict(path, OP, "a file already exists at this path"));
            }
            Some(VolumeItem::Directory(_)) => {
                return Err(VolumeError::conflict(path, OP, "directory already exists"));
            }
            None => {}
        }
        self.check_parent(path, OP)?;

        self.backend
            .create_dir(&path.volume_path_string())
            .map_err(|e| VolumeError::storage(path, OP, e))?;
        tracing::debug!(volume = %self.name, %path, "created directory");
        Ok(VolumeDirectory::new(path.clone()))
    }

    /// Replace the whole content of the file at `path`, creating it when absent.
    pub fn write(&mut self, path: &VolumePath, content: &FileContent) -> Result<(), VolumeError> {
        const OP: &str = "save";
        if path.is_root() {
            return Err(VolumeError::conflict(path, OP, "the volume root is a directory"));
        }
        if let Some(VolumeItem::Directory(_)) = self.open(path) {
            return Err(VolumeError::conflict(path, OP, "a directory already exists at this path"));
        }
        self.check_parent(path, OP)?;

        self.backend
            .write(&path.volume_path_string(), content.as_bytes())
            .map_err(|e| VolumeError::storage(path, OP, e))
    }

    /// Status-valued [`write`](Self::write): `false` when the content could not be persisted.
    pub fn save(&mut self, path: &VolumePath, content: &FileContent) -> bool {
        match self.write(path, content) {
            Ok(()) => {
                tracing::debug!(volume = %self.name, %path, bytes = content.len(), "saved file");
                true
            }
            Err(e) => {
                tracing::warn!(volume = %self.name, %path, error = %e, "save failed");
                false
            }
        }
    }

    /// Remove the item at `path`, recursively for directories.
    ///
    /// Returns `false` when nothing exists there, for the volume root, and
    /// when the backend refuses.
    pub fn delete(&mut self, path: &VolumePath) -> bool {
        if path.is_root() {
            tracing::warn!(volume = %self.name, "refusing to delete volume root");
            return false;
        }
        if !self.exists(path) {
            return false;
        }
        match self.remove_tree(&path.volume_path_string()) {
            Ok(()) => {
                tracing::debug!(volume = %self.name, %path, "deleted");
                true
            }
            Err(e) => {
                tracing::warn!(volume = %self.name, %path, error = %e, "delete failed");
                false
            }
        }
    }

    fn remove_tree(&mut self, key: &str) -> Result<(), BackendError> {
        if self.backend.entry_kind(key) == Some(EntryKind::Directory) {
            for name in self.backend.children(key)? {
                self.remove_tree(&child_path(key, &name))?;
            }
        }
        self.backend.remove(key)
    }

    /// Full content of the file at `path`.
    pub fn read_all(&self, path: &VolumePath) -> Result<FileContent, VolumeError> {
        const OP: &str = "read";
        match self.backend.entry_kind(&path.volume_path_string()) {
            Some(EntryKind::File) => self
                .backend
                .read(&path.volume_path_string())
                .map(FileContent::new)
                .map_err(|e| VolumeError::storage(path, OP, e)),
            _ => Err(VolumeError::file_not_found(path, OP)),
        }
    }

    /// Children of the directory at `path`, in name order.
    pub fn list(&self, path: &VolumePath) -> Result<Vec<VolumeItem>, VolumeError> {
        const OP: &str = "list";
        match self.backend.entry_kind(&path.volume_path_string()) {
            Some(EntryKind::Directory) => {}
            Some(EntryKind::File) => return Err(VolumeError::invalid_directory(path, OP)),
            None => return Err(VolumeError::path_not_found(path, OP)),
        }
        let names = self
            .backend
            .children(&path.volume_path_string())
            .map_err(|e| VolumeError::storage(path, OP, e))?;
        Ok(names
            .iter()
            .filter_map(|name| self.open(&path.join(name)))
            .collect())
    }

    fn check_parent(&self, path: &VolumePath, operation: &str) -> Result<(), VolumeError> {
        let parent = path
            .parent()
            .ok_or_else(|| VolumeError::path_not_found(path, operation))?;
        match self.open(&parent) {
            Some(VolumeItem::Directory(_)) => Ok(()),
            _ => Err(VolumeError::path_not_found(parent, operation)),
        }
    }
}

impl VolumeFile {
    pub fn read_all(&self, volume: &Volume) -> Result<FileContent, VolumeError> {
        volume.read_all(self.path())
    }

    /// Replace the file's content; see [`Volume::save`].
    pub fn write(&self, volume: &mut Volume, content: &FileContent) -> bool {
        volume.save(self.path(), content)
    }
}

impl VolumeDirectory {
    pub fn list(&self, volume: &Volume) -> Result<Vec<VolumeItem>, VolumeError> {
        volume.list(self.path())
    }

    pub fn child(&self, volume: &Volume, name: &str) -> Option<VolumeItem> {
        volume.open(&self.path().join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::VolumeId;

    fn p(text: &str) -> VolumePath {
        let segments = text.split('/').filter(|s| !s.is_empty()).map(String::from).collect();
        VolumePath::from_segments(VolumeId::Index(0), segments)
    }

    fn volume_with(files: &[(&str, &str)]) -> Volume {
        Volume::new("test", InMemoryBackend::with_files(files))
    }

    #[test]
    fn test_open_kinds() {
        let volume = volume_with(&[("/a/f.txt", "hello")]);
        match volume.open(&p("/a/f.txt")) {
            Some(VolumeItem::File(file)) => assert_eq!(file.size(), 5),
            other => panic!("expected file, got {:?}", other),
        }
        assert!(volume.open(&p("/a")).unwrap().is_directory());
        assert!(volume.open(&p("/")).unwrap().is_directory());
        assert!(volume.open(&p("/missing")).is_none());
    }

    #[test]
    fn test_create_file_requires_parent() {
        let mut volume = Volume::in_memory("test");
        let err = volume.create_file(&p("/nope/f.txt")).unwrap_err();
        assert!(matches!(err, VolumeError::PathNotFound { .. }));
        assert_eq!(err.operation(), "create");

        let file = volume.create_file(&p("/f.txt")).unwrap();
        assert_eq!(file.size(), 0);
        assert!(volume.exists(&p("/f.txt")));
    }

    #[test]
    fn test_create_file_over_directory_conflicts() {
        let mut volume = Volume::in_memory("test");
        volume.create_directory(&p("/d")).unwrap();
        assert!(matches!(volume.create_file(&p("/d")), Err(VolumeError::Conflict { .. })));
        assert!(matches!(volume.create_file(&p("/")), Err(VolumeError::Conflict { .. })));
        assert!(volume.open(&p("/d")).unwrap().is_directory());
    }

    #[test]
    fn test_create_file_truncates_existing() {
        let mut volume = volume_with(&[("/f", "old")]);
        volume.create_file(&p("/f")).unwrap();
        assert_eq!(volume.read_all(&p("/f")).unwrap(), FileContent::from(""));
    }

    #[test]
    fn test_create_file_under_file_parent() {
        let mut volume = volume_with(&[("/f", "x")]);
        assert!(matches!(volume.create_file(&p("/f/g")), Err(VolumeError::PathNotFound { .. })));
    }

    #[test]
    fn test_create_directory_rules() {
        let mut volume = volume_with(&[("/f", "x")]);
        assert!(matches!(volume.create_directory(&p("/f")), Err(VolumeError::Conflict { .. })));
        assert!(matches!(volume.create_directory(&p("/a/b")), Err(VolumeError::PathNotFound { .. })));
        volume.create_directory(&p("/a")).unwrap();
        assert!(matches!(volume.create_directory(&p("/a")), Err(VolumeError::Conflict { .. })));
        volume.create_directory(&p("/a/b")).unwrap();
        assert!(volume.open(&p("/a/b")).unwrap().is_directory());
    }

    #[test]
    fn test_save_and_read() {
        let mut volume = Volume::in_memory("test");
        assert!(volume.save(&p("/f.txt"), &FileContent::from("one")));
        assert!(volume.save(&p("/f.txt"), &FileContent::from("two")));
        assert_eq!(volume.read_all(&p("/f.txt")).unwrap().text(), "two");
    }

    #[test]
    fn test_save_reports_failure_as_false() {
        let mut full = Volume::new("tiny", InMemoryBackend::with_capacity(3));
        assert!(!full.save(&p("/f"), &FileContent::from("too long")));
        assert!(!full.exists(&p("/f")));

        let mut frozen = Volume::new("ro", InMemoryBackend::new().read_only());
        assert!(!frozen.save(&p("/f"), &FileContent::from("x")));

        let mut volume = Volume::in_memory("test");
        assert!(!volume.save(&p("/missing/f"), &FileContent::from("x")));
        volume.create_directory(&p("/d")).unwrap();
        assert!(!volume.save(&p("/d"), &FileContent::from("x")));
    }

    #[test]
    fn test_delete_semantics() {
        let mut volume = volume_with(&[("/d/a", "1"), ("/d/sub/b", "2"), ("/keep", "3")]);
        assert!(!volume.delete(&p("/missing")));
        assert!(volume.delete(&p("/d")));
        assert!(!volume.exists(&p("/d")));
        assert!(!volume.exists(&p("/d/sub/b")));
        assert!(volume.exists(&p("/keep")));
        assert!(!volume.delete(&p("/")));
    }

    #[test]
    fn test_list_in_name_order() {
        let volume = volume_with(&[("/d/c", "1"), ("/d/a", "2"), ("/d/b/x", "3")]);
        let names: Vec<String> = volume
            .list(&p("/d"))
            .unwrap()
            .iter()
            .map(|item| item.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(matches!(volume.list(&p("/d/a")), Err(VolumeError::InvalidDirectory { .. })));
        assert!(matches!(volume.list(&p("/zz")), Err(VolumeError::PathNotFound { .. })));
    }

    #[test]
    fn test_item_capabilities() {
        let mut volume = volume_with(&[("/d/f", "abc")]);
        let dir = match volume.open(&p("/d")) {
            Some(VolumeItem::Directory(dir)) => dir,
            other => panic!("expected directory, got {:?}", other),
        };
        let file = match dir.child(&volume, "f") {
            Some(VolumeItem::File(file)) => file,
            other => panic!("expected file, got {:?}", other),
        };
        assert_eq!(file.read_all(&volume).unwrap().text(), "abc");
        assert!(file.write(&mut volume, &FileContent::from("xyz")));
        assert_eq!(file.read_all(&volume).unwrap().text(), "xyz");
        assert_eq!(dir.list(&volume).unwrap().len(), 1);
        assert!(dir.child(&volume, "nope").is_none());
    }

    #[test]
    fn test_read_all_of_directory_is_file_not_found() {
        let volume = volume_with(&[("/d/f", "x")]);
        assert!(matches!(volume.read_all(&p("/d")), Err(VolumeError::FileNotFound { .. })));
    }

    #[test]
    fn test_free_space() {
        let mut volume = Volume::new("dev", InMemoryBackend::with_capacity(100));
        assert_eq!(volume.free_space(), Some(100));
        assert!(volume.save(&p("/f"), &FileContent::from("0123456789")));
        assert_eq!(volume.free_space(), Some(90));
        assert_eq!(Volume::in_memory("x").free_space(), None);
    }
}
