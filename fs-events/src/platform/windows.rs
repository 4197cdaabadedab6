//! ReadDirectoryChangesW capability table (Windows).
//!
//! Like inotify, the two halves of a rename arrive as separate old-name and
//! new-name notifications, so only the departing half is a removal.

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

use super::{Backend, Interest};
use crate::event::ChangeKind;

pub(crate) struct ReadDirectoryChanges;

impl Backend for ReadDirectoryChanges {
    fn interest(watch_permission_changes: bool) -> Interest {
        let mut classes = Interest::CREATE | Interest::REMOVE | Interest::WRITE | Interest::RENAME;
        if watch_permission_changes {
            classes |= Interest::METADATA;
        }
        classes
    }

    fn classify(kind: EventKind) -> ChangeKind {
        match kind {
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => ChangeKind::Remove,
            _ => ChangeKind::NonRemove,
        }
    }
}
