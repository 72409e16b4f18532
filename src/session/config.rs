//! Session Configuration
//!
//! [`SessionOptions`] is the programmatic configuration; [`LayoutConfig`] is
//! the TOML volume layout the CLI loads:
//!
//! ```toml
//! start = "local"
//!
//! [[volume]]
//! name = "archive"
//! kind = "directory"
//! root = "./archive"
//!
//! [[volume]]
//! name = "local"
//! capacity = 5000
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::fs::{BackendError, DirectoryBackend, InMemoryBackend, Volume};
use crate::path::VolumeId;

/// Options for creating a [`Session`](super::Session).
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// Volumes registered in slot order (defaults to in-memory "archive" and "local")
    pub volumes: Option<Vec<Volume>>,
    /// Volume to start on (defaults to the lowest slot)
    pub start_volume: Option<VolumeId>,
    /// Directory to start in, resolved on the start volume
    pub start_directory: Option<String>,
}

impl SessionOptions {
    /// The default two-volume layout.
    pub fn default_volumes() -> Vec<Volume> {
        vec![Volume::in_memory("archive"), Volume::in_memory("local")]
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("volume '{name}': directory volumes need a root")]
    MissingRoot { name: String },

    #[error("volume '{name}': {source}")]
    Backend {
        name: String,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    #[default]
    Memory,
    Directory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeConfig {
    pub name: String,
    #[serde(default)]
    pub kind: VolumeKind,
    pub root: Option<PathBuf>,
    pub capacity: Option<u64>,
    #[serde(default)]
    pub read_only: bool,
}

impl VolumeConfig {
    pub fn build(&self) -> Result<Volume, ConfigError> {
        match self.kind {
            VolumeKind::Memory => {
                let mut backend = match self.capacity {
                    Some(bytes) => InMemoryBackend::with_capacity(bytes),
                    None => InMemoryBackend::new(),
                };
                if self.read_only {
                    backend = backend.read_only();
                }
                Ok(Volume::new(self.name.clone(), backend))
            }
            VolumeKind::Directory => {
                let root = self
                    .root
                    .as_ref()
                    .ok_or_else(|| ConfigError::MissingRoot { name: self.name.clone() })?;
                let mut backend = DirectoryBackend::open(root).map_err(|source| ConfigError::Backend {
                    name: self.name.clone(),
                    source,
                })?;
                if let Some(bytes) = self.capacity {
                    backend = backend.with_capacity(bytes);
                }
                if self.read_only {
                    backend = backend.read_only();
                }
                Ok(Volume::new(self.name.clone(), backend))
            }
        }
    }
}

/// Volume layout file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    /// Start volume: a name or slot number
    pub start: Option<String>,
    /// Start directory on the start volume
    pub directory: Option<String>,
    #[serde(default, rename = "volume")]
    pub volumes: Vec<VolumeConfig>,
}

impl LayoutConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Build session options; an empty volume list keeps the default layout.
    pub fn into_options(self) -> Result<SessionOptions, ConfigError> {
        let volumes = if self.volumes.is_empty() {
            None
        } else {
            Some(
                self.volumes
                    .iter()
                    .map(VolumeConfig::build)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        };
        Ok(SessionOptions {
            volumes,
            start_volume: self.start.as_deref().map(VolumeId::parse),
            start_directory: self.directory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let config = LayoutConfig::from_toml_str(
            r#"
start = "local"
directory = "/boot"

[[volume]]
name = "archive"

[[volume]]
name = "local"
capacity = 5000
read_only = true
"#,
        )
        .unwrap();
        assert_eq!(config.start.as_deref(), Some("local"));
        assert_eq!(config.volumes.len(), 2);
        assert_eq!(config.volumes[0].kind, VolumeKind::Memory);
        assert_eq!(config.volumes[1].capacity, Some(5000));
        assert!(config.volumes[1].read_only);

        let options = config.into_options().unwrap();
        let volumes = options.volumes.unwrap();
        assert_eq!(volumes[1].capacity(), Some(5000));
        assert!(volumes[1].is_read_only());
        assert_eq!(options.start_volume, Some(VolumeId::Name("local".into())));
        assert_eq!(options.start_directory.as_deref(), Some("/boot"));
    }

    #[test]
    fn test_directory_volume_needs_root() {
        let config = LayoutConfig::from_toml_str(
            r#"
[[volume]]
name = "archive"
kind = "directory"
"#,
        )
        .unwrap();
        assert!(matches!(config.into_options(), Err(ConfigError::MissingRoot { .. })));
    }

    #[test]
    fn test_directory_volume_builds() {
        let tmp = tempfile::tempdir().unwrap();
        let config = VolumeConfig {
            name: "archive".into(),
            kind: VolumeKind::Directory,
            root: Some(tmp.path().join("arc")),
            capacity: None,
            read_only: false,
        };
        let volume = config.build().unwrap();
        assert_eq!(volume.name(), "archive");
        assert!(tmp.path().join("arc").is_dir());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = LayoutConfig::from_toml_str("[[volume]]\nname = \"x\"\nkind = \"tape\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_empty_layout_keeps_defaults() {
        let options = LayoutConfig::default().into_options().unwrap();
        assert!(options.volumes.is_none());
        assert!(options.start_volume.is_none());
    }
}
