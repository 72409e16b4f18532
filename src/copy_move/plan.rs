//! Copy planning.
//!
//! A copy is done in three phases: snapshot the source tree, plan and
//! validate every write against the destination, then apply the plan. If a
//! step fails while applying, the steps already applied are undone in
//! reverse order.

use crate::fs::{FileContent, Volume, VolumeError, VolumeItem};
use crate::path::VolumePath;

const OP: &str = "copy";

/// Immutable copy of a source subtree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Snapshot {
    File { name: String, content: FileContent },
    Directory { name: String, children: Vec<Snapshot> },
}

impl Snapshot {
    /// Capture `item` and everything below it. Children are kept in name order.
    pub(crate) fn capture(volume: &Volume, item: &VolumeItem) -> Result<Self, VolumeError> {
        let name = item.name().to_string();
        match item {
            VolumeItem::File(file) => Ok(Snapshot::File { name, content: file.read_all(volume)? }),
            VolumeItem::Directory(dir) => {
                let children = dir
                    .list(volume)?
                    .iter()
                    .map(|child| Snapshot::capture(volume, child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Snapshot::Directory { name, children })
            }
        }
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            Snapshot::File { name, .. } | Snapshot::Directory { name, .. } => name,
        }
    }

    pub(crate) fn is_directory(&self) -> bool {
        matches!(self, Snapshot::Directory { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    CreateDirectory(VolumePath),
    WriteFile {
        path: VolumePath,
        content: FileContent,
        /// Content being overwritten, restored on rollback.
        previous: Option<FileContent>,
    },
}

impl Step {
    pub(crate) fn path(&self) -> &VolumePath {
        match self {
            Step::CreateDirectory(path) | Step::WriteFile { path, .. } => path,
        }
    }
}

/// Validated sequence of writes on one destination volume.
#[derive(Debug, Default)]
pub(crate) struct CopyPlan {
    steps: Vec<Step>,
}

impl CopyPlan {
    /// Plan placing `snapshot` at `target`.
    ///
    /// Fails with the first conflict or missing parent; nothing is written.
    pub(crate) fn build(
        volume: &Volume,
        snapshot: &Snapshot,
        target: &VolumePath,
    ) -> Result<Self, VolumeError> {
        let mut plan = CopyPlan::default();
        if volume.open(target).is_none() {
            let parent_is_dir = matches!(
                target.parent().and_then(|parent| volume.open(&parent)),
                Some(VolumeItem::Directory(_))
            );
            if !parent_is_dir {
                let parent = target.parent().unwrap_or_else(|| target.clone());
                return Err(VolumeError::path_not_found(parent, OP));
            }
        }
        plan.place(volume, snapshot, target, false)?;
        Ok(plan)
    }

    /// `fresh` marks a target whose parent this plan creates, so it is known absent.
    fn place(
        &mut self,
        volume: &Volume,
        node: &Snapshot,
        target: &VolumePath,
        fresh: bool,
    ) -> Result<(), VolumeError> {
        let existing = if fresh { None } else { volume.open(target) };
        match (node, existing) {
            (Snapshot::File { content, .. }, None) => {
                self.steps.push(Step::WriteFile {
                    path: target.clone(),
                    content: content.clone(),
                    previous: None,
                });
            }
            (Snapshot::File { content, .. }, Some(VolumeItem::File(file))) => {
                let previous = file.read_all(volume)?;
                self.steps.push(Step::WriteFile {
                    path: target.clone(),
                    content: content.clone(),
                    previous: Some(previous),
                });
            }
            (Snapshot::File { .. }, Some(VolumeItem::Directory(_))) => {
                return Err(VolumeError::conflict(
                    target,
                    OP,
                    "a directory already exists at this path",
                ));
            }
            (Snapshot::Directory { children, .. }, None) => {
                self.steps.push(Step::CreateDirectory(target.clone()));
                for child in children {
                    self.place(volume, child, &target.join(child.name()), true)?;
                }
            }
            (Snapshot::Directory { .. }, Some(VolumeItem::File(_))) => {
                return Err(VolumeError::conflict(target, OP, "cannot copy directory onto a file"));
            }
            (Snapshot::Directory { children, .. }, Some(VolumeItem::Directory(_))) => {
                for child in children {
                    self.place(volume, child, &target.join(child.name()), false)?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// First planned path at or below `root`, if any.
    pub(crate) fn first_write_under(&self, root: &VolumePath) -> Option<&VolumePath> {
        self.steps.iter().map(Step::path).find(|path| path.starts_with(root))
    }

    /// Apply every step; on failure undo the applied ones and return the error.
    pub(crate) fn apply(&self, volume: &mut Volume) -> Result<(), VolumeError> {
        for (done, step) in self.steps.iter().enumerate() {
            let result = match step {
                Step::CreateDirectory(path) => volume.create_directory(path).map(|_| ()),
                Step::WriteFile { path, content, .. } => volume.write(path, content),
            };
            if let Err(e) = result {
                tracing::warn!(error = %e, applied = done, "copy failed, rolling back");
                self.undo(volume, done);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Undo the first `count` steps, last first.
    pub(crate) fn undo(&self, volume: &mut Volume, count: usize) {
        for step in self.steps[..count].iter().rev() {
            let restored = match step {
                Step::CreateDirectory(path) | Step::WriteFile { path, previous: None, .. } => {
                    volume.delete(path)
                }
                Step::WriteFile { path, previous: Some(previous), .. } => volume.save(path, previous),
            };
            if !restored {
                tracing::warn!(step = ?step, "rollback step failed");
            }
        }
    }
}
