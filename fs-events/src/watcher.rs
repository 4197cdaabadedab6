//! Watch session setup and the event pump.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_channel::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::backend::{BackendWatcher, RawEvent};
use crate::config::WatchConfig;
use crate::error::{Result, WatcherError};
use crate::event::ChangeEvent;
use crate::matcher::IgnoreMatcher;
use crate::platform::{Backend, PlatformBackend};

/// Install a recursive watch over `root` and stream canonical change events.
///
/// Events arrive one at a time over the returned channel, in backend order,
/// with paths relative to the canonical root; `"."` names the root itself.
/// When the backend falls behind and notifications are lost, the stream
/// carries a single [`ChangeEvent::rescan`] instead of the lost events.
///
/// The stream performs no deduplication: backends may legitimately report
/// one logical change several times, and suppressing repeats is the
/// consumer's concern.
///
/// The hand-off to the consumer is unbuffered, so a consumer that stops
/// receiving eventually stalls the session; always trigger `cancel` when the
/// consumer goes away. Once `cancel` fires the native watch is released and
/// the stream closes.
///
/// Must be called from within a tokio runtime; the session's event pump is
/// spawned onto it.
pub fn watch(
    root: impl AsRef<Path>,
    matcher: Arc<dyn IgnoreMatcher>,
    cancel: CancellationToken,
    config: WatchConfig,
) -> Result<Receiver<ChangeEvent>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(WatcherError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize()?;

    let interest = PlatformBackend::interest(config.watch_permission_changes);
    let capacity = config.backend_capacity.max(1);

    let pre_filter = {
        let root = root.clone();
        let matcher = Arc::clone(&matcher);
        move |path: &Path| !matcher.should_ignore(&relative_to_root(&root, path))
    };

    let (backend, raw_rx, overflow) =
        BackendWatcher::install(root.clone(), interest, pre_filter, capacity)?;

    debug!("Watching {} with interest {interest:?}", root.display());

    let (out_tx, out_rx) = async_channel::bounded(1);

    let pump = EventPump {
        root,
        matcher,
        raw_rx,
        out_tx,
        overflow,
        capacity,
        cancel,
    };
    tokio::spawn(pump.run(backend));

    Ok(out_rx)
}

/// One running watch session: drains the backend queue, applies overflow
/// recovery, boundary and ignore checks, classification, and forwards the
/// canonical events downstream until cancelled.
struct EventPump {
    root: PathBuf,
    matcher: Arc<dyn IgnoreMatcher>,
    raw_rx: Receiver<RawEvent>,
    out_tx: Sender<ChangeEvent>,
    overflow: Arc<AtomicBool>,
    capacity: usize,
    cancel: CancellationToken,
}

impl EventPump {
    /// Drive the session to completion, then release the native watch.
    ///
    /// `backend` is taken by value rather than stored: it is only touched
    /// for teardown, and some native watcher handles must not be shared
    /// across the pump's suspension points.
    async fn run(self, backend: BackendWatcher) {
        loop {
            if self.overflowed() {
                // Whatever is still queued is a stale slice of a burst that
                // already lost members; replaying it would reorder history.
                // Discard it and let one whole-tree rescan stand in for all
                // of it.
                let mut discarded = 0usize;
                while self.raw_rx.try_recv().is_ok() {
                    discarded += 1;
                }
                debug!("Backend queue overflowed, discarded {discarded} queued events");
                if !self.forward(ChangeEvent::rescan()).await {
                    break;
                }
                continue;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    trace!("Watch session cancelled");
                    break;
                }
                raw = self.raw_rx.recv() => match raw {
                    Ok(raw) => {
                        if !self.process(raw).await {
                            break;
                        }
                    }
                    // The backend callback is gone; nothing more will arrive.
                    Err(_) => break,
                },
            }
        }

        backend.stop();
    }

    /// Whether notification loss must be assumed.
    ///
    /// Either the adapter latched a drop (failed push or a kernel-side
    /// rescan flag), or the queue is at capacity, meaning pushes may already
    /// have failed without being observed yet.
    fn overflowed(&self) -> bool {
        let latched = self.overflow.swap(false, Ordering::Relaxed);
        latched || self.raw_rx.len() >= self.capacity
    }

    async fn process(&self, raw: RawEvent) -> bool {
        let relative = relative_to_root(&self.root, &raw.path);

        // Second line of defense: some backends buffer before the pre-filter
        // can reject.
        if self.matcher.should_ignore(&relative) {
            trace!("Ignoring change at {}", relative.display());
            return true;
        }

        let event = ChangeEvent::new(PlatformBackend::classify(raw.kind), relative);
        self.forward(event).await
    }

    /// Hand one event to the consumer, unless cancellation wins the race.
    /// Returns `false` when the session should stop.
    async fn forward(&self, event: ChangeEvent) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.out_tx.send(event) => sent.is_ok(),
        }
    }
}

/// Root-relative form of `path`; the root itself maps to `"."`.
///
/// The backend pre-filter guarantees that every queued event lies under the
/// watched root. An event that does not is a filter-contract bug that would
/// make the session report changes for the wrong tree, so it aborts the
/// session rather than being skipped.
fn relative_to_root(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Ok(relative) => relative.to_path_buf(),
        Err(_) => panic!(
            "watch backend produced an event outside of the watched root: {} is not under {}",
            path.display(),
            root.display()
        ),
    }
}
