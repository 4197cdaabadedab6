//! FSEvents capability table (macOS, iOS).
//!
//! FSEvents raises a single undifferentiated rename flag for both halves of
//! a rename, so every rename kind is treated as a removal; paths that moved
//! into the tree are rediscovered by the consumer's next scan of the renamed
//! entry's parent.

use notify::EventKind;
use notify::event::ModifyKind;

use super::{Backend, Interest};
use crate::event::ChangeKind;

pub(crate) struct Fsevents;

impl Backend for Fsevents {
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
