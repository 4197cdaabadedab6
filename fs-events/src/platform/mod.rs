//! Per-backend event-class capability tables.
//!
//! Every supported backend family gets one implementation of [`Backend`]:
//! a derivation of the event classes a session subscribes to, and a pure
//! mapping from native event kinds onto the two-kind canonical vocabulary.
//! The mapping is data, not logic; keep the tables in sync with what each
//! native backend can actually emit.
//!
//! Families differ most visibly around renames: inotify and
//! ReadDirectoryChangesW report the two halves of a rename separately, so
//! only the departing half counts as a removal, while FSEvents and kqueue
//! report an undifferentiated rename flag, so both halves have to be treated
//! as removals and the consumer rediscovers surviving paths on its next scan.

use bitflags::bitflags;
use notify::EventKind;
use notify::event::ModifyKind;

use crate::event::ChangeKind;

#[cfg(any(target_os = "linux", target_os = "android"))]
mod inotify;

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod fsevents;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(any(
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
mod kqueue;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) type PlatformBackend = inotify::Inotify;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub(crate) type PlatformBackend = fsevents::Fsevents;

#[cfg(target_os = "windows")]
pub(crate) type PlatformBackend = windows::ReadDirectoryChanges;

#[cfg(any(
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
pub(crate) type PlatformBackend = kqueue::Kqueue;

bitflags! {
    /// Event classes a watch session subscribes to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Interest: u8 {
        /// Entry creation, including moves into the watched tree.
        const CREATE = 1 << 0;
        /// Entry removal, including removal of the watched root itself.
        const REMOVE = 1 << 1;
        /// Content writes.
        const WRITE = 1 << 2;
        /// Either half of a rename, including renames of the root itself.
        const RENAME = 1 << 3;
        /// Permission and other metadata-only changes.
        const METADATA = 1 << 4;
    }
}

/// Capability table for one backend family.
pub(crate) trait Backend {
    /// Event classes one watch session subscribes to.
    fn interest(watch_permission_changes: bool) -> Interest;

    /// Classify a native event kind into the canonical vocabulary.
    ///
    /// Total over every kind admitted by [`Backend::interest`]; kinds the
    /// family never emits classify as [`ChangeKind::NonRemove`].
    fn classify(kind: EventKind) -> ChangeKind;
}

/// The interest class a native event kind belongs to.
///
/// Used by the backend adapter to drop unsubscribed raw events before they
/// occupy queue capacity. Kinds of unknown shape map to [`Interest::WRITE`]
/// so that real changes are never silently discarded; pure access
/// notifications map to no class at all.
pub(crate) fn class_of(kind: EventKind) -> Interest {
    match kind {
        EventKind::Create(_) => Interest::CREATE,
        EventKind::Remove(_) => Interest::REMOVE,
        EventKind::Modify(ModifyKind::Name(_)) => Interest::RENAME,
        EventKind::Modify(ModifyKind::Metadata(_)) => Interest::METADATA,
        EventKind::Modify(_) => Interest::WRITE,
        EventKind::Access(_) => Interest::empty(),
        EventKind::Any | EventKind::Other => Interest::WRITE,
    }
}
