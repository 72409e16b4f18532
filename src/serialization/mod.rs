//! Serialization Module
//!
//! Persists structured values as tagged JSON files on a volume.

pub mod json;
pub mod value;

pub use json::{decode, encode, CodecError};
pub use value::{Lexicon, Shared, Value};

use crate::fs::{FileContent, VolumeError, VolumeItem};
use crate::path::VolumePath;
use crate::session::VolumeRegistry;

/// Encode `value` and save it at `path`.
///
/// Encoding happens before any I/O, so an unserializable value never touches
/// the volume. Returns the volume's `save` status.
pub fn write_structured(
    registry: &mut VolumeRegistry,
    path: &VolumePath,
    value: &Value,
) -> Result<bool, VolumeError> {
    const OP: &str = "writejson";
    let text = encode(value).map_err(|e| VolumeError::NotSerializable {
        path: path.to_string(),
        operation: OP.to_string(),
        reason: e.to_string(),
    })?;

    let volume = registry.volume_for_mut(path)?;
    let saved = volume.save(path, &FileContent::from(text));
    tracing::debug!(%path, saved, "wrote structured value");
    Ok(saved)
}

/// Read the file at `path` and decode it.
pub fn read_structured(registry: &VolumeRegistry, path: &VolumePath) -> Result<Value, VolumeError> {
    const OP: &str = "readjson";
    let volume = registry.volume_for(path)?;
    let content = match volume.open(path) {
        Some(VolumeItem::File(file)) => file.read_all(volume)?,
        _ => return Err(VolumeError::file_not_found(path, OP)),
    };

    let text = content.as_str().ok_or_else(|| VolumeError::Deserialization {
        path: path.to_string(),
        operation: OP.to_string(),
        reason: "content is not valid UTF-8".to_string(),
    })?;
    decode(text).map_err(|e| VolumeError::Deserialization {
        path: path.to_string(),
        operation: OP.to_string(),
        reason: e.to_string(),
    })
}
