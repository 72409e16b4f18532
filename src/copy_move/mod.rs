//! Copy and Move
//!
//! Copy follows one decision table over (source kind, destination state):
//!
//! | source    | destination absent   | destination file | destination directory          |
//! |-----------|----------------------|------------------|--------------------------------|
//! | file      | new file             | overwrite        | new child named after source   |
//! | directory | new directory + copy | `Conflict`       | new child directory + copy     |
//!
//! The table is applied again to each child, in name order. A copy either
//! lands completely or leaves the destination as it was. Move is a copy
//! followed by deleting the source.

mod plan;

use plan::{CopyPlan, Snapshot};

use crate::fs::{VolumeError, VolumeItem};
use crate::path::VolumePath;
use crate::session::VolumeRegistry;

/// Source item and the final path it will occupy.
struct Placement {
    source: VolumePath,
    item: VolumeItem,
    target: VolumePath,
}

fn locate(
    registry: &VolumeRegistry,
    source: &VolumePath,
    destination: &VolumePath,
    operation: &str,
) -> Result<Placement, VolumeError> {
    let source = registry.canonicalize(source)?;
    let destination = registry.canonicalize(destination)?;

    let item = registry
        .volume_for(&source)?
        .open(&source)
        .ok_or_else(|| VolumeError::path_not_found(&source, operation))?;

    let target = match registry.volume_for(&destination)?.open(&destination) {
        // A volume root has no name to nest under, so its children merge in.
        Some(VolumeItem::Directory(_)) if source.is_root() => destination,
        Some(VolumeItem::Directory(_)) => destination.join(item.name()),
        Some(VolumeItem::File(_)) | None => destination,
    };
    Ok(Placement { source, item, target })
}

fn plan_copy(registry: &VolumeRegistry, placement: &Placement) -> Result<(Snapshot, CopyPlan), VolumeError> {
    let snapshot = Snapshot::capture(registry.volume_for(&placement.source)?, &placement.item)?;
    let plan = CopyPlan::build(registry.volume_for(&placement.target)?, &snapshot, &placement.target)?;
    Ok((snapshot, plan))
}

/// Copy `source` to `destination` and return the path of the copy.
pub fn copy_item(
    registry: &mut VolumeRegistry,
    source: &VolumePath,
    destination: &VolumePath,
) -> Result<VolumePath, VolumeError> {
    let placement = locate(registry, source, destination, "copy")?;
    let (_, plan) = plan_copy(registry, &placement)?;
    plan.apply(registry.volume_for_mut(&placement.target)?)?;

    tracing::info!(
        source = %placement.source,
        target = %placement.target,
        steps = plan.steps().len(),
        "copied"
    );
    Ok(placement.target)
}

/// Move `source` to `destination` and return the new path.
///
/// Moving an item onto itself does nothing. If the source cannot be removed
/// after the copy, the copy is undone and `NotRemoved` is returned.
pub fn move_item(
    registry: &mut VolumeRegistry,
    source: &VolumePath,
    destination: &VolumePath,
) -> Result<VolumePath, VolumeError> {
    const OP: &str = "move";
    let placement = locate(registry, source, destination, OP)?;
    if placement.target == placement.source {
        tracing::debug!(path = %placement.source, "move onto itself");
        return Ok(placement.target);
    }
    if placement.source.is_root() {
        return Err(VolumeError::conflict(&placement.source, OP, "cannot move a volume root"));
    }
    if placement.item.is_directory() && placement.target.starts_with(&placement.source) {
        return Err(VolumeError::conflict(
            &placement.target,
            OP,
            "cannot move a directory into itself",
        ));
    }

    let (snapshot, plan) = plan_copy(registry, &placement)?;
    if let Some(inside) = plan.first_write_under(&placement.source) {
        return Err(VolumeError::conflict(
            inside,
            OP,
            "cannot move a directory onto one of its ancestors",
        ));
    }
    plan.apply(registry.volume_for_mut(&placement.target)?)?;

    if !registry.volume_for_mut(&placement.source)?.delete(&placement.source) {
        // Only undo when the source is intact; a half-deleted source keeps the copy.
        let source_volume = registry.volume_for(&placement.source)?;
        let intact = source_volume
            .open(&placement.source)
            .map(|item| Snapshot::capture(source_volume, &item))
            .transpose()?
            .is_some_and(|current| current == snapshot);
        if intact {
            plan.undo(registry.volume_for_mut(&placement.target)?, plan.steps().len());
        }
        return Err(VolumeError::NotRemoved {
            path: placement.source.to_string(),
            operation: OP.to_string(),
        });
    }

    tracing::info!(source = %placement.source, target = %placement.target, "moved");
    Ok(placement.target)
}
