//! # fs-events
//!
//! This crate provides file system change detection for the Vigil sync
//! engine. It installs a recursive watch over a directory subtree and
//! delivers a reliable, ordered stream of normalized change events until
//! cancellation.
//!
//! ## Guarantees
//!
//! - **One vocabulary**: every native backend (inotify, FSEvents, kqueue,
//!   ReadDirectoryChangesW) is reduced to `Remove` / `NonRemove` events with
//!   root-relative paths
//! - **No silent loss**: when the backend falls behind, lost notifications
//!   are replaced by a single whole-tree rescan event
//! - **Bounded shutdown**: cancellation releases the native watch and closes
//!   the stream, with no leaked OS resources
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Watch Session                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  OS kernel ──► BackendWatcher ──► EventPump ──► ChangeEvent     │
//! │                     │                 │                         │
//! │                     ▼                 ▼                         │
//! │                pre-filter        IgnoreMatcher                  │
//! │               (boundary +       + per-platform                  │
//! │                ignore)           classification                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend pushes raw events into a bounded queue; the pump drains it,
//! detects overflow, translates paths, filters, classifies, and hands each
//! event to the consumer over an unbuffered channel.

pub mod config;
pub mod error;
pub mod event;
pub mod matcher;
pub mod watcher;

mod backend;
mod platform;

pub use config::{DEFAULT_BACKEND_CAPACITY, WatchConfig};
pub use error::{Result, WatcherError};
pub use event::{ChangeEvent, ChangeKind};
pub use matcher::{IgnoreMatcher, IgnoreNothing};
pub use watcher::watch;
