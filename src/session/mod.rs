//! Session
//!
//! One registry of volumes plus the current volume and directory. Every
//! operation takes path text or an already resolved path, anchors it against
//! the session's context and routes it to the owning volume.

pub mod config;
mod registry;

pub use config::{ConfigError, LayoutConfig, SessionOptions, VolumeConfig, VolumeKind};
pub use registry::VolumeRegistry;

use crate::copy_move;
use crate::fs::{VolumeDirectory, VolumeError, VolumeFile, VolumeItem};
use crate::path::{VolumeId, VolumePath};
use crate::serialization::{self, Value};

/// Something a session operation can address.
///
/// Text is resolved against the current context; a [`VolumePath`] is only
/// canonicalized, so names the path grammar cannot spell still work.
pub trait PathLike {
    fn locate(&self, registry: &VolumeRegistry) -> Result<VolumePath, VolumeError>;
}

impl PathLike for str {
    fn locate(&self, registry: &VolumeRegistry) -> Result<VolumePath, VolumeError> {
        registry.resolve(self)
    }
}

impl PathLike for String {
    fn locate(&self, registry: &VolumeRegistry) -> Result<VolumePath, VolumeError> {
        registry.resolve(self)
    }
}

impl PathLike for VolumePath {
    fn locate(&self, registry: &VolumeRegistry) -> Result<VolumePath, VolumeError> {
        registry.canonicalize(self)
    }
}

#[derive(Debug)]
pub struct Session {
    registry: VolumeRegistry,
    script_path: Option<VolumePath>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Result<Self, VolumeError> {
        let mut registry = VolumeRegistry::new();
        for volume in options.volumes.unwrap_or_else(SessionOptions::default_volumes) {
            registry.register(volume)?;
        }
        if let Some(start) = &options.start_volume {
            registry.switch_to(start)?;
        }
        if let Some(directory) = &options.start_directory {
            let path = registry.resolve(directory)?;
            registry.set_current_directory(&path)?;
        }
        Ok(Self { registry, script_path: None })
    }

    pub fn registry(&self) -> &VolumeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VolumeRegistry {
        &mut self.registry
    }

    /// Resolve path text against the current context.
    pub fn path(&self, text: &str) -> Result<VolumePath, VolumeError> {
        self.registry.resolve(text)
    }

    /// Canonical path for text or a resolved path.
    pub fn locate<P: PathLike + ?Sized>(&self, path: &P) -> Result<VolumePath, VolumeError> {
        path.locate(&self.registry)
    }

    pub fn current_path(&self) -> VolumePath {
        self.registry.current_directory()
    }

    /// The volume file of the script being run, if any.
    pub fn script_path(&self) -> Option<&VolumePath> {
        self.script_path.as_ref()
    }

    /// Set the running script and return the previous one.
    pub fn set_script_path(&mut self, path: Option<VolumePath>) -> Option<VolumePath> {
        std::mem::replace(&mut self.script_path, path)
    }

    pub fn switch(&mut self, volume: &VolumeId) -> Result<(), VolumeError> {
        self.registry.switch_to(volume)
    }

    pub fn cd<P: PathLike + ?Sized>(&mut self, path: &P) -> Result<VolumePath, VolumeError> {
        let path = self.locate(path)?;
        self.registry.set_current_directory(&path)?;
        Ok(path)
    }

    pub fn copy<S, D>(&mut self, source: &S, destination: &D) -> Result<VolumePath, VolumeError>
    where
        S: PathLike + ?Sized,
        D: PathLike + ?Sized,
    {
        let source = self.locate(source)?;
        let destination = self.locate(destination)?;
        copy_move::copy_item(&mut self.registry, &source, &destination)
    }

    pub fn move_item<S, D>(&mut self, source: &S, destination: &D) -> Result<VolumePath, VolumeError>
    where
        S: PathLike + ?Sized,
        D: PathLike + ?Sized,
    {
        let source = self.locate(source)?;
        let destination = self.locate(destination)?;
        copy_move::move_item(&mut self.registry, &source, &destination)
    }

    /// Delete an item, recursively for directories.
    pub fn delete<P: PathLike + ?Sized>(&mut self, path: &P) -> Result<(), VolumeError> {
        const OP: &str = "delete";
        let path = self.locate(path)?;
        let volume = self.registry.volume_for_mut(&path)?;
        if !volume.exists(&path) {
            return Err(VolumeError::path_not_found(&path, OP));
        }
        if !volume.delete(&path) {
            return Err(VolumeError::NotRemoved { path: path.to_string(), operation: OP.to_string() });
        }
        tracing::info!(%path, "deleted");
        Ok(())
    }

    pub fn exists<P: PathLike + ?Sized>(&self, path: &P) -> Result<bool, VolumeError> {
        let path = self.locate(path)?;
        Ok(self.registry.volume_for(&path)?.exists(&path))
    }

    pub fn open<P: PathLike + ?Sized>(&self, path: &P) -> Result<VolumeItem, VolumeError> {
        let path = self.locate(path)?;
        self.registry
            .volume_for(&path)?
            .open(&path)
            .ok_or_else(|| VolumeError::path_not_found(&path, "open"))
    }

    pub fn create<P: PathLike + ?Sized>(&mut self, path: &P) -> Result<VolumeFile, VolumeError> {
        let path = self.locate(path)?;
        self.registry.volume_for_mut(&path)?.create_file(&path)
    }

    pub fn create_dir<P: PathLike + ?Sized>(&mut self, path: &P) -> Result<VolumeDirectory, VolumeError> {
        let path = self.locate(path)?;
        self.registry.volume_for_mut(&path)?.create_directory(&path)
    }

    pub fn list<P: PathLike + ?Sized>(&self, path: &P) -> Result<Vec<VolumeItem>, VolumeError> {
        let path = self.locate(path)?;
        self.registry.volume_for(&path)?.list(&path)
    }

    /// Persist `value` as a tagged JSON file; `false` if the volume refused the write.
    pub fn write_json<P: PathLike + ?Sized>(&mut self, value: &Value, path: &P) -> Result<bool, VolumeError> {
        let path = self.locate(path)?;
        serialization::write_structured(&mut self.registry, &path, value)
    }

    pub fn read_json<P: PathLike + ?Sized>(&self, path: &P) -> Result<Value, VolumeError> {
        let path = self.locate(path)?;
        serialization::read_structured(&self.registry, &path)
    }
}
