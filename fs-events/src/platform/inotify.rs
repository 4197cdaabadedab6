//! inotify capability table (Linux, Android).
//!
//! inotify reports the two halves of a rename as separate move-from and
//! move-to notifications, so only the departing half is a removal. A rename
//! of the watched root itself surfaces as an undifferentiated rename kind
//! and counts as a removal.

use notify::EventKind;
use notify::event::{ModifyKind, RenameMode};

use super::{Backend, Interest};
use crate::event::ChangeKind;

pub(crate) struct Inotify;

impl Backend for Inotify {
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
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => ChangeKind::Remove,
            _ => ChangeKind::NonRemove,
        }
    }
}
