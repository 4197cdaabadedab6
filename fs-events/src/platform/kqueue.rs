//! kqueue capability table (FreeBSD, NetBSD, OpenBSD, DragonFly).
//!
//! kqueue's NOTE_RENAME does not say which side of the rename a vnode is on,
//! so every rename kind is treated as a removal, mirroring the FSEvents
//! table.

use notify::EventKind;
use notify::event::ModifyKind;

use super::{Backend, Interest};
use crate::event::ChangeKind;

pub(crate) struct Kqueue;

impl Backend for Kqueue {
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
            EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Remove,
            _ => ChangeKind::NonRemove,
        }
    }
}
