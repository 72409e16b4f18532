//! File System Module
//!
//! Volumes and the storage backends beneath them.
//! Backends:
//! - InMemoryBackend: pure in-memory storage with optional quota (default)
//! - DirectoryBackend: a host directory as a volume root

pub mod backend;
pub mod directory_backend;
pub mod in_memory_backend;
pub mod types;
pub mod volume;

pub use backend::StorageBackend;
pub use directory_backend::DirectoryBackend;
pub use in_memory_backend::InMemoryBackend;
pub use types::*;
pub use volume::Volume;
