//! Volume Registry
//!
//! Slot-indexed volumes plus the session's resolution context. The context
//! changes only through [`VolumeRegistry::switch_to`] and
//! [`VolumeRegistry::set_current_directory`] (and when the current volume is
//! removed).

use std::collections::BTreeMap;

use crate::fs::{Volume, VolumeError, VolumeItem};
use crate::path::{self, ResolutionContext, VolumeId, VolumePath};

#[derive(Debug)]
pub struct VolumeRegistry {
    volumes: BTreeMap<usize, Volume>,
    context: ResolutionContext,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self {
            volumes: BTreeMap::new(),
            context: ResolutionContext::at_root(VolumeId::Index(0)),
        }
    }

    /// Register `volume` in the lowest free slot and return that slot.
    pub fn register(&mut self, volume: Volume) -> Result<usize, VolumeError> {
        let slot = (0..).find(|slot| !self.volumes.contains_key(slot)).unwrap_or(0);
        self.register_at(slot, volume)?;
        Ok(slot)
    }

    /// Register `volume` in a specific slot.
    pub fn register_at(&mut self, slot: usize, volume: Volume) -> Result<(), VolumeError> {
        const OP: &str = "register";
        if self.volumes.contains_key(&slot) {
            return Err(VolumeError::conflict(slot, OP, "volume slot already in use"));
        }
        if !volume.name().is_empty() && self.slot_by_name(volume.name()).is_some() {
            return Err(VolumeError::conflict(volume.name(), OP, "volume name already in use"));
        }
        if VolumeId::parse(volume.name()) != VolumeId::Name(volume.name().to_string()) {
            return Err(VolumeError::conflict(volume.name(), OP, "volume name must not be numeric"));
        }

        let first = self.volumes.is_empty();
        tracing::info!(slot, name = volume.name(), "registered volume");
        self.volumes.insert(slot, volume);
        if first {
            self.context = ResolutionContext::at_root(VolumeId::Index(slot));
        }
        Ok(())
    }

    /// Remove a volume. Removing the current volume moves the context to the
    /// root of the lowest remaining slot.
    pub fn remove(&mut self, id: &VolumeId) -> Option<Volume> {
        let slot = self.slot_of(id)?;
        let volume = self.volumes.remove(&slot)?;
        tracing::info!(slot, name = volume.name(), "removed volume");

        if self.context.current_volume() == &VolumeId::Index(slot) {
            if let Some(&next) = self.volumes.keys().next() {
                self.context = ResolutionContext::at_root(VolumeId::Index(next));
            }
        }
        Some(volume)
    }

    fn slot_by_name(&self, name: &str) -> Option<usize> {
        self.volumes
            .iter()
            .find(|(_, volume)| volume.name() == name)
            .map(|(slot, _)| *slot)
    }

    /// Slot of the volume `id` names, if registered.
    pub fn slot_of(&self, id: &VolumeId) -> Option<usize> {
        match id {
            VolumeId::Index(slot) => self.volumes.contains_key(slot).then_some(*slot),
            VolumeId::Name(name) => self.slot_by_name(name),
            VolumeId::Current => match self.context.current_volume() {
                VolumeId::Current => None,
                current => self.slot_of(current),
            },
        }
    }

    pub fn get(&self, id: &VolumeId) -> Option<&Volume> {
        self.slot_of(id).and_then(|slot| self.volumes.get(&slot))
    }

    pub fn get_mut(&mut self, id: &VolumeId) -> Option<&mut Volume> {
        let slot = self.slot_of(id)?;
        self.volumes.get_mut(&slot)
    }

    /// The volume owning `path`.
    pub fn volume_for(&self, path: &VolumePath) -> Result<&Volume, VolumeError> {
        self.get(path.volume()).ok_or_else(|| not_found(path.volume(), path, "open"))
    }

    pub fn volume_for_mut(&mut self, path: &VolumePath) -> Result<&mut Volume, VolumeError> {
        let slot = self
            .slot_of(path.volume())
            .ok_or_else(|| not_found(path.volume(), path, "open"))?;
        self.volumes
            .get_mut(&slot)
            .ok_or_else(|| not_found(path.volume(), path, "open"))
    }

    /// Rewrite the path's volume identifier to its slot index.
    pub fn canonicalize(&self, path: &VolumePath) -> Result<VolumePath, VolumeError> {
        let slot = self
            .slot_of(path.volume())
            .ok_or_else(|| not_found(path.volume(), path, "resolve"))?;
        Ok(path.with_volume(VolumeId::Index(slot)))
    }

    /// Resolve text against the current context into a canonical path.
    pub fn resolve(&self, text: &str) -> Result<VolumePath, VolumeError> {
        let resolved = path::resolve(text, &self.context)?;
        let slot = self
            .slot_of(resolved.volume())
            .ok_or_else(|| not_found(resolved.volume(), text, "resolve"))?;
        Ok(resolved.with_volume(VolumeId::Index(slot)))
    }

    /// Make `id` the current volume. The current directory resets to its root.
    pub fn switch_to(&mut self, id: &VolumeId) -> Result<(), VolumeError> {
        let slot = self
            .slot_of(id)
            .ok_or_else(|| not_found(id, id, "switch"))?;
        self.context = ResolutionContext::at_root(VolumeId::Index(slot));
        tracing::info!(slot, "switched volume");
        Ok(())
    }

    /// Change directory. The target must be an existing directory; its volume
    /// becomes the current volume.
    pub fn set_current_directory(&mut self, path: &VolumePath) -> Result<(), VolumeError> {
        const OP: &str = "cd";
        let slot = self
            .slot_of(path.volume())
            .ok_or_else(|| not_found(path.volume(), path, OP))?;
        match self.volumes.get(&slot).and_then(|volume| volume.open(path)) {
            Some(VolumeItem::Directory(_)) => {
                self.context = ResolutionContext::new(VolumeId::Index(slot), path.segments().to_vec());
                tracing::debug!(%path, "changed directory");
                Ok(())
            }
            _ => Err(VolumeError::invalid_directory(path, OP)),
        }
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn current_directory(&self) -> VolumePath {
        self.context.current_directory()
    }

    pub fn current_volume(&self) -> Result<&Volume, VolumeError> {
        let current = self.context.current_volume();
        self.get(current)
            .ok_or_else(|| not_found(current, current, "current"))
    }

    /// Registered volumes in slot order.
    pub fn volumes(&self) -> impl Iterator<Item = (usize, &Volume)> {
        self.volumes.iter().map(|(slot, volume)| (*slot, volume))
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

impl Default for VolumeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(volume: &VolumeId, path: impl ToString, operation: &str) -> VolumeError {
    VolumeError::VolumeNotFound {
        volume: volume.to_string(),
        path: path.to_string(),
        operation: operation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryBackend;

    fn registry() -> VolumeRegistry {
        let mut registry = VolumeRegistry::new();
        registry
            .register(Volume::new("archive", InMemoryBackend::with_files(&[("/docs/readme", "hi")])))
            .unwrap();
        registry
            .register(Volume::new("local", InMemoryBackend::with_files(&[("/boot/start", "go")])))
            .unwrap();
        registry
    }

    #[test]
    fn test_register_assigns_lowest_free_slot() {
        let mut registry = registry();
        assert_eq!(registry.len(), 2);
        registry.remove(&VolumeId::Index(0));
        assert_eq!(registry.register(Volume::in_memory("spare")).unwrap(), 0);
        assert_eq!(registry.register(Volume::in_memory("more")).unwrap(), 2);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = registry();
        assert!(matches!(
            registry.register(Volume::in_memory("archive")),
            Err(VolumeError::Conflict { .. })
        ));
        assert!(matches!(
            registry.register_at(1, Volume::in_memory("other")),
            Err(VolumeError::Conflict { .. })
        ));
        assert!(matches!(
            registry.register(Volume::in_memory("42")),
            Err(VolumeError::Conflict { .. })
        ));
    }

    #[test]
    fn test_lookup_by_name_index_and_current() {
        let registry = registry();
        assert_eq!(registry.get(&VolumeId::Name("local".into())).unwrap().name(), "local");
        assert_eq!(registry.get(&VolumeId::Index(0)).unwrap().name(), "archive");
        assert_eq!(registry.get(&VolumeId::Current).unwrap().name(), "archive");
        assert!(registry.get(&VolumeId::Index(7)).is_none());
    }

    #[test]
    fn test_volume_for_unknown_volume() {
        let registry = registry();
        let path = VolumePath::root(VolumeId::Name("floppy".into()));
        let err = registry.volume_for(&path).unwrap_err();
        assert!(matches!(err, VolumeError::VolumeNotFound { .. }));
        assert_eq!(err.path(), "floppy:/");
    }

    #[test]
    fn test_resolve_canonicalizes_names() {
        let registry = registry();
        let by_name = registry.resolve("local:/boot/start").unwrap();
        let by_index = registry.resolve("1:/boot/start").unwrap();
        assert_eq!(by_name, by_index);
        assert_eq!(by_name.to_string(), "1:/boot/start");
        assert!(matches!(registry.resolve("floppy:/x"), Err(VolumeError::VolumeNotFound { .. })));
    }

    #[test]
    fn test_switch_resets_directory_to_root() {
        let mut registry = registry();
        let docs = registry.resolve("/docs").unwrap();
        registry.set_current_directory(&docs).unwrap();
        assert_eq!(registry.current_directory().to_string(), "0:/docs");

        registry.switch_to(&VolumeId::Name("local".into())).unwrap();
        assert_eq!(registry.current_directory().to_string(), "1:/");
        assert_eq!(registry.current_volume().unwrap().name(), "local");

        assert!(matches!(
            registry.switch_to(&VolumeId::Index(9)),
            Err(VolumeError::VolumeNotFound { .. })
        ));
        assert_eq!(registry.current_directory().to_string(), "1:/");
    }

    #[test]
    fn test_set_current_directory_requires_directory() {
        let mut registry = registry();
        let file = registry.resolve("/docs/readme").unwrap();
        assert!(matches!(
            registry.set_current_directory(&file),
            Err(VolumeError::InvalidDirectory { .. })
        ));
        let missing = registry.resolve("/nope").unwrap();
        assert!(matches!(
            registry.set_current_directory(&missing),
            Err(VolumeError::InvalidDirectory { .. })
        ));
        assert_eq!(registry.current_directory().to_string(), "0:/");
    }

    #[test]
    fn test_cd_to_other_volume_switches_volume() {
        let mut registry = registry();
        let boot = registry.resolve("1:/boot").unwrap();
        registry.set_current_directory(&boot).unwrap();
        assert_eq!(registry.context().current_volume(), &VolumeId::Index(1));
        assert_eq!(registry.resolve("start").unwrap().to_string(), "1:/boot/start");
    }

    #[test]
    fn test_removing_current_volume_resets_context() {
        let mut registry = registry();
        registry.switch_to(&VolumeId::Index(1)).unwrap();
        let removed = registry.remove(&VolumeId::Current).unwrap();
        assert_eq!(removed.name(), "local");
        assert_eq!(registry.current_directory().to_string(), "0:/");

        registry.remove(&VolumeId::Index(0));
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve("/x"), Err(VolumeError::VolumeNotFound { .. })));
    }
}
