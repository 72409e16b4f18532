//! Path Types
//!
//! Volume identifiers, resolved volume paths and the resolution context
//! carried by a session.

use std::fmt;

/// Identifies a volume inside a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VolumeId {
    Name(String),
    Index(usize),
    /// Whatever volume the session currently has active.
    Current,
}

impl VolumeId {
    /// Parse a qualifier: all-digit text is a slot index, anything else a name.
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return VolumeId::Index(index);
            }
        }
        VolumeId::Name(text.to_string())
    }
}

impl From<usize> for VolumeId {
    fn from(index: usize) -> Self {
        VolumeId::Index(index)
    }
}

impl From<&str> for VolumeId {
    fn from(text: &str) -> Self {
        VolumeId::parse(text)
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeId::Name(name) => write!(f, "{}", name),
            VolumeId::Index(index) => write!(f, "{}", index),
            VolumeId::Current => write!(f, "current"),
        }
    }
}

/// A fully resolved, volume-anchored path.
///
/// Segments never contain `.`, `..` or separators; an empty segment list is
/// the volume root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumePath {
    volume: VolumeId,
    segments: Vec<String>,
}

impl VolumePath {
    pub fn root(volume: VolumeId) -> Self {
        Self { volume, segments: Vec::new() }
    }

    /// Build a path from already validated segments.
    pub fn from_segments(volume: VolumeId, segments: Vec<String>) -> Self {
        Self { volume, segments }
    }

    pub fn volume(&self) -> &VolumeId {
        &self.volume
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Containing directory, `None` for the root.
    pub fn parent(&self) -> Option<VolumePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            volume: self.volume.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn join(&self, name: &str) -> VolumePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { volume: self.volume.clone(), segments }
    }

    pub fn with_volume(&self, volume: VolumeId) -> VolumePath {
        Self { volume, segments: self.segments.clone() }
    }

    /// True when `self` is `other` or lies beneath it on the same volume.
    pub fn starts_with(&self, other: &VolumePath) -> bool {
        self.volume == other.volume
            && self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// The path inside its volume, e.g. `/dir/file.txt`.
    pub fn volume_path_string(&self) -> String {
        if self.segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", self.segments.join("/"))
        }
    }
}

impl fmt::Display for VolumePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.volume, self.volume_path_string())
    }
}

/// Session defaults used for unqualified and relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    current_volume: VolumeId,
    current_directory: Vec<String>,
}

impl ResolutionContext {
    pub fn new(current_volume: VolumeId, current_directory: Vec<String>) -> Self {
        Self { current_volume, current_directory }
    }

    pub fn at_root(current_volume: VolumeId) -> Self {
        Self::new(current_volume, Vec::new())
    }

    pub fn current_volume(&self) -> &VolumeId {
        &self.current_volume
    }

    pub fn current_directory_segments(&self) -> &[String] {
        &self.current_directory
    }

    pub fn current_directory(&self) -> VolumePath {
        VolumePath::from_segments(self.current_volume.clone(), self.current_directory.clone())
    }
}
