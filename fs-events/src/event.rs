//! Canonical change events delivered to watch consumers.

use std::path::Path;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A normalized file system change.
///
/// Change events are plain values with structural equality so that consumers
/// can deduplicate repeats themselves; the watch pipeline never does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Path of the changed entry, relative to the watched root. `"."` names
    /// the root itself.
    pub path: PathBuf,

    /// What happened at the path.
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// The whole-tree fallback event emitted after notification loss.
    ///
    /// Consumers must treat it as "anything under the root may have changed"
    /// and rescan accordingly.
    pub fn rescan() -> Self {
        Self::new(ChangeKind::NonRemove, ".")
    }

    /// Whether this event covers the entire watched root.
    pub fn is_rescan(&self) -> bool {
        self.kind == ChangeKind::NonRemove && self.path == Path::new(".")
    }
}

/// Kind of change.
///
/// The native backends report a much richer vocabulary; consumers only need
/// to know whether a path went away or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// The path was deleted, moved away, or renamed away.
    Remove,

    /// The path was created, modified, moved into place, or had its
    /// attributes changed.
    NonRemove,
}
