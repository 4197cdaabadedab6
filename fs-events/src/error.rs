//! Error types for watch sessions.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for watch operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur while installing a watch.
///
/// These are all setup-time failures: once a session is running, overflow is
/// absorbed by the rescan fallback and cancellation is a normal exit, so the
/// event stream itself never carries errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// The watch root does not exist or is not a directory.
    #[error("not a watchable directory: {0}")]
    NotADirectory(PathBuf),

    /// The host's watch-descriptor limit is exhausted.
    #[error(
        "failed to install file system watch: the host's watch limit is \
         exhausted; on Linux, raise fs.inotify.max_user_watches and \
         fs.inotify.max_user_instances, then retry"
    )]
    WatchLimitReached(#[source] notify::Error),

    /// Any other backend failure while installing the watch.
    #[error("watch backend error: {0}")]
    Backend(notify::Error),

    /// IO error while resolving the watch root.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<notify::Error> for WatcherError {
    fn from(err: notify::Error) -> Self {
        if reached_watch_limit(&err) {
            Self::WatchLimitReached(err)
        } else {
            Self::Backend(err)
        }
    }
}

/// Whether a backend error means the host's watch-descriptor limit is
/// exhausted. inotify reports this as ENOSPC from `inotify_add_watch`, which
/// callers routinely mistake for a full disk, hence the dedicated variant.
fn reached_watch_limit(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::MaxFilesWatch => true,
        notify::ErrorKind::Io(io_err) => io_err.kind() == io::ErrorKind::StorageFull,
        _ => false,
    }
}
