//! File System Types
//!
//! Error kinds, file content and the closed File/Directory item variant.

use std::borrow::Cow;

use thiserror::Error;

use crate::path::VolumePath;

/// Errors raised by path resolution, volume routing and item operations.
///
/// Every variant names the offending path text and the operation that failed.
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("EMALFORMED: malformed path ({reason}), {operation} '{path}'")]
    MalformedPath { path: String, operation: String, reason: String },

    #[error("ENOVOLUME: volume '{volume}' not found, {operation} '{path}'")]
    VolumeNotFound { volume: String, path: String, operation: String },

    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    PathNotFound { path: String, operation: String },

    #[error("ENOTDIR: invalid directory, {operation} '{path}'")]
    InvalidDirectory { path: String, operation: String },

    #[error("EEXIST: {reason}, {operation} '{path}'")]
    Conflict { path: String, operation: String, reason: String },

    #[error("ESERIALIZE: value is not serializable ({reason}), {operation} '{path}'")]
    NotSerializable { path: String, operation: String, reason: String },

    #[error("EDESERIALIZE: could not decode content ({reason}), {operation} '{path}'")]
    Deserialization { path: String, operation: String, reason: String },

    #[error("ENOFILE: file does not exist, {operation} '{path}'")]
    FileNotFound { path: String, operation: String },

    #[error("EBUSY: could not remove, {operation} '{path}'")]
    NotRemoved { path: String, operation: String },

    #[error("EIO: {source}, {operation} '{path}'")]
    Storage {
        path: String,
        operation: String,
        #[source]
        source: BackendError,
    },
}

impl VolumeError {
    pub fn path_not_found(path: impl ToString, operation: &str) -> Self {
        VolumeError::PathNotFound { path: path.to_string(), operation: operation.to_string() }
    }

    pub fn conflict(path: impl ToString, operation: &str, reason: &str) -> Self {
        VolumeError::Conflict {
            path: path.to_string(),
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_directory(path: impl ToString, operation: &str) -> Self {
        VolumeError::InvalidDirectory { path: path.to_string(), operation: operation.to_string() }
    }

    pub fn file_not_found(path: impl ToString, operation: &str) -> Self {
        VolumeError::FileNotFound { path: path.to_string(), operation: operation.to_string() }
    }

    pub fn storage(path: impl ToString, operation: &str, source: BackendError) -> Self {
        VolumeError::Storage { path: path.to_string(), operation: operation.to_string(), source }
    }

    /// The offending path text.
    pub fn path(&self) -> &str {
        match self {
            VolumeError::MalformedPath { path, .. }
            | VolumeError::VolumeNotFound { path, .. }
            | VolumeError::PathNotFound { path, .. }
            | VolumeError::InvalidDirectory { path, .. }
            | VolumeError::Conflict { path, .. }
            | VolumeError::NotSerializable { path, .. }
            | VolumeError::Deserialization { path, .. }
            | VolumeError::FileNotFound { path, .. }
            | VolumeError::NotRemoved { path, .. }
            | VolumeError::Storage { path, .. } => path,
        }
    }

    /// The operation that was attempted.
    pub fn operation(&self) -> &str {
        match self {
            VolumeError::MalformedPath { operation, .. }
            | VolumeError::VolumeNotFound { operation, .. }
            | VolumeError::PathNotFound { operation, .. }
            | VolumeError::InvalidDirectory { operation, .. }
            | VolumeError::Conflict { operation, .. }
            | VolumeError::NotSerializable { operation, .. }
            | VolumeError::Deserialization { operation, .. }
            | VolumeError::FileNotFound { operation, .. }
            | VolumeError::NotRemoved { operation, .. }
            | VolumeError::Storage { operation, .. } => operation,
        }
    }
}

/// Failures reported by a storage backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("no such entry '{0}'")]
    NotFound(String),

    #[error("not a directory '{0}'")]
    NotDirectory(String),

    #[error("directory not empty '{0}'")]
    NotEmpty(String),

    #[error("not enough space: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: u64, available: u64 },

    #[error("read-only volume")]
    ReadOnly,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Kind of an entry as seen by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Whole content of a file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileContent {
    bytes: Vec<u8>,
}

impl FileContent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Text view, invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Strict text view.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        FileContent::new(s.into_bytes())
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        FileContent::new(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(v: Vec<u8>) -> Self {
        FileContent::new(v)
    }
}

/// A file view: its path and the size observed when it was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeFile {
    path: VolumePath,
    size: u64,
}

impl VolumeFile {
    pub(crate) fn new(path: VolumePath, size: u64) -> Self {
        Self { path, size }
    }

    pub fn path(&self) -> &VolumePath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name().unwrap_or("")
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// A directory view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDirectory {
    path: VolumePath,
}

impl VolumeDirectory {
    pub(crate) fn new(path: VolumePath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &VolumePath {
        &self.path
    }

    /// Empty for a volume root.
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or("")
    }
}

/// A live view of one item inside a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeItem {
    File(VolumeFile),
    Directory(VolumeDirectory),
}

impl VolumeItem {
    pub fn path(&self) -> &VolumePath {
        match self {
            VolumeItem::File(file) => file.path(),
            VolumeItem::Directory(dir) => dir.path(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VolumeItem::File(file) => file.name(),
            VolumeItem::Directory(dir) => dir.name(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            VolumeItem::File(_) => EntryKind::File,
            VolumeItem::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, VolumeItem::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, VolumeItem::Directory(_))
    }
}
