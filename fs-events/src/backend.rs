//! Adapter over the native change-notification backend.
//!
//! Wraps [`notify`]'s recommended per-platform watcher and reduces its
//! callback-shaped delivery to a bounded queue of single-path raw events.
//! The callback runs on the backend's own delivery thread and must never
//! block, so events are pushed with `try_send`; a push that finds the queue
//! full is counted as notification loss and latched for the event pump's
//! overflow recovery.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_channel::{Receiver, TrySendError};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, trace, warn};

use crate::error::Result;
use crate::platform::{Interest, class_of};

/// One native notification, reduced to a single absolute path and its kind.
///
/// Raw events never travel past the classifier; consumers only ever see the
/// canonical [`crate::ChangeEvent`].
#[derive(Debug, Clone)]
pub(crate) struct RawEvent {
    pub(crate) path: PathBuf,
    pub(crate) kind: EventKind,
}

/// Handle on an installed recursive native watch.
pub(crate) struct BackendWatcher {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

impl BackendWatcher {
    /// Install a recursive watch on `root`.
    ///
    /// `pre_filter` decides, from an event's absolute path, whether it may
    /// occupy queue capacity; it runs on the backend's delivery thread.
    /// Returns the watch handle, the raw-event queue, and the shared
    /// overflow latch.
    pub(crate) fn install(
        root: PathBuf,
        interest: Interest,
        pre_filter: impl Fn(&Path) -> bool + Send + 'static,
        capacity: usize,
    ) -> Result<(Self, Receiver<RawEvent>, Arc<AtomicBool>)> {
        let (raw_tx, raw_rx) = async_channel::bounded(capacity);
        let overflow = Arc::new(AtomicBool::new(false));

        let mut watcher = RecommendedWatcher::new(
            {
                let overflow = Arc::clone(&overflow);
                move |result: notify::Result<Event>| {
                    let event = match result {
                        Ok(event) => event,
                        Err(e) => {
                            error!("Watch backend reported an error: {e}");
                            return;
                        }
                    };

                    if event.need_rescan() {
                        // The kernel-side queue already overflowed; there is
                        // nothing useful left to forward for this event.
                        overflow.store(true, Ordering::Relaxed);
                        return;
                    }

                    if !interest.intersects(class_of(event.kind)) {
                        trace!("Dropping unsubscribed event kind {:?}", event.kind);
                        return;
                    }

                    for raw in split_paths(event) {
                        if !pre_filter(&raw.path) {
                            continue;
                        }
                        match raw_tx.try_send(raw) {
                            Ok(()) => {}
                            Err(TrySendError::Full(raw)) => {
                                // The event is lost; the pump turns the latch
                                // into a whole-tree rescan.
                                warn!(
                                    "Backend queue is full, dropped change at {}",
                                    raw.path.display()
                                );
                                overflow.store(true, Ordering::Relaxed);
                            }
                            Err(TrySendError::Closed(_)) => {
                                trace!("Watch session is shutting down, dropping event");
                            }
                        }
                    }
                }
            },
            Config::default(),
        )?;

        if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
            // Release the partially opened native handle before reporting.
            drop(watcher);
            return Err(e.into());
        }

        Ok((Self { watcher, root }, raw_rx, overflow))
    }

    /// Tear down the native watch and release its OS resources.
    pub(crate) fn stop(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            // Expected when the root itself was removed while watched.
            warn!("Unable to unwatch {}: {e}", self.root.display());
        }
        trace!("Stopped watching {}", self.root.display());
    }
}

/// Flatten one native event into per-path raw events.
///
/// A paired rename arrives as a single two-path event; it is split back into
/// a departing and an arriving half so classification stays a pure per-path
/// mapping.
fn split_paths(event: Event) -> Vec<RawEvent> {
    if let (EventKind::Modify(ModifyKind::Name(RenameMode::Both)), [from, to]) =
        (event.kind, event.paths.as_slice())
    {
        return vec![
            RawEvent {
                path: from.clone(),
                kind: EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            },
            RawEvent {
                path: to.clone(),
                kind: EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            },
        ];
    }

    let kind = event.kind;
    event
        .paths
        .into_iter()
        .map(|path| RawEvent { path, kind })
        .collect()
}
