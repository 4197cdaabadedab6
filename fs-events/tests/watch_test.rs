//! End-to-end watch scenarios against a real file system.
//!
//! Each scenario installs a watch over a fresh temporary root, mutates the
//! tree, and collects canonical events until everything expected has been
//! seen. Consecutive or repeated identical events are tolerated everywhere:
//! backends legitimately report one logical change several times, and
//! suppressing repeats is by contract the consumer's job.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use vigil_fs_events::{ChangeEvent, ChangeKind, IgnoreMatcher, WatchConfig, WatcherError, watch};

const SCENARIO_TIMEOUT: Duration = Duration::from_secs(10);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Ignores exactly one root-relative name, like a single ignore rule would.
struct NameMatcher(Option<&'static str>);

impl IgnoreMatcher for NameMatcher {
    fn should_ignore(&self, relative_path: &Path) -> bool {
        self.0.is_some_and(|name| relative_path == Path::new(name))
    }
}

fn create_file(root: &Path, name: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"contents").unwrap();
}

/// Account for one received event. Expected events are checked off, repeats
/// of already-accepted events are tolerated, and anything else either passes
/// (`allow_others`, reported by returning `true`) or fails the scenario.
fn note(
    event: ChangeEvent,
    missing: &mut HashSet<ChangeEvent>,
    seen: &mut HashSet<ChangeEvent>,
    allow_others: bool,
) -> bool {
    assert!(
        event.path.is_relative() && !event.path.starts_with(".."),
        "event escaped the watched root: {event:?}"
    );
    if missing.remove(&event) {
        seen.insert(event);
        return false;
    }
    if seen.contains(&event) {
        // Backends repeat themselves; dedup is the consumer's job.
        return false;
    }
    assert!(
        allow_others,
        "unexpected event {event:?}, still waiting for {missing:?}"
    );
    true
}

/// Install a watch, run `mutate` against the root, and collect events until
/// every expected event has been seen.
///
/// With `allow_others`, unexpected events are tolerated (and briefly slept
/// on, to let bursts pile up behind the unbuffered hand-off); without it,
/// any event that is neither expected nor a repeat fails the scenario.
/// Every received path is asserted to stay inside the root, and the stream
/// is asserted to close after cancellation.
async fn run_scenario(
    config: WatchConfig,
    ignored: Option<&'static str>,
    allow_others: bool,
    prepare: fn(&Path),
    mutate: fn(&Path),
    expected: &[ChangeEvent],
) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    prepare(&root);

    let cancel = CancellationToken::new();
    let events = watch(&root, Arc::new(NameMatcher(ignored)), cancel.clone(), config).unwrap();

    // Give the backend a moment to become fully armed; FSEvents in
    // particular reports nothing for changes made too soon after install.
    sleep(Duration::from_millis(300)).await;

    let mutation = tokio::task::spawn_blocking({
        let root = root.clone();
        move || mutate(&root)
    });

    let mut missing: HashSet<ChangeEvent> = expected.iter().cloned().collect();
    let mut seen: HashSet<ChangeEvent> = HashSet::new();

    let collect = async {
        while !missing.is_empty() {
            let event = events.recv().await.expect("event stream closed early");
            if note(event, &mut missing, &mut seen, allow_others) {
                // Leave bursts time to pile up behind the unbuffered
                // hand-off, so overflow scenarios actually overflow.
                sleep(Duration::from_millis(100)).await;
            }
        }
    };
    timeout(SCENARIO_TIMEOUT, collect)
        .await
        .expect("timed out before receiving all expected events");

    // Keep draining a little longer: late arrivals must obey the same rules,
    // in particular nothing filtered or out-of-root may trickle in.
    let _ = timeout(Duration::from_millis(500), async {
        while let Ok(event) = events.recv().await {
            note(event, &mut missing, &mut seen, allow_others);
        }
    })
    .await;

    mutation.await.unwrap();

    cancel.cancel();
    timeout(SHUTDOWN_TIMEOUT, async {
        while events.recv().await.is_ok() {}
    })
    .await
    .expect("stream did not close after cancellation");
}

#[tokio::test]
async fn test_create_and_delete_classify() {
    run_scenario(
        WatchConfig::new(),
        None,
        false,
        |_| {},
        |root| {
            create_file(root, "file");
            thread::sleep(Duration::from_millis(300));
            fs::remove_file(root.join("file")).unwrap();
        },
        &[
            ChangeEvent::new(ChangeKind::NonRemove, "file"),
            ChangeEvent::new(ChangeKind::Remove, "file"),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_ignored_names_are_filtered() {
    run_scenario(
        WatchConfig::new(),
        Some("ignored"),
        false,
        |_| {},
        |root| {
            create_file(root, "file");
            create_file(root, "ignored");
        },
        &[ChangeEvent::new(ChangeKind::NonRemove, "file")],
    )
    .await;
}

#[tokio::test]
async fn test_rename_reports_both_names() {
    // Only backends that distinguish the two halves of a rename can report
    // the destination as a non-removal; the others overshoot with a removal
    // and the consumer rediscovers the destination on its next scan.
    let destination_kind = if cfg!(any(
        target_os = "linux",
        target_os = "android",
        target_os = "windows"
    )) {
        ChangeKind::NonRemove
    } else {
        ChangeKind::Remove
    };

    run_scenario(
        WatchConfig::new(),
        None,
        false,
        |root| create_file(root, "oldfile"),
        |root| fs::rename(root.join("oldfile"), root.join("newfile")).unwrap(),
        &[
            ChangeEvent::new(ChangeKind::Remove, "oldfile"),
            ChangeEvent::new(destination_kind, "newfile"),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_moving_a_subtree_out_stays_inside_the_root() {
    run_scenario(
        WatchConfig::new(),
        None,
        true,
        |root| create_file(root, "dir/file"),
        |root| {
            let outside = tempfile::tempdir().unwrap();
            fs::rename(root.join("dir"), outside.path().join("dir")).unwrap();
            thread::sleep(Duration::from_millis(300));
            // Dropping `outside` deletes the moved subtree; none of that may
            // surface as events, and the harness asserts every path it does
            // see stays root-relative.
        },
        &[ChangeEvent::new(ChangeKind::Remove, "dir")],
    )
    .await;
}

#[tokio::test]
async fn test_overflow_collapses_into_rescan() {
    run_scenario(
        WatchConfig::new().with_backend_capacity(10),
        None,
        true,
        |_| {},
        |root| {
            for i in 0..50 {
                create_file(root, &format!("file{i}"));
            }
        },
        &[ChangeEvent::rescan()],
    )
    .await;
}

#[tokio::test]
async fn test_permission_changes_are_opt_in() {
    run_scenario(
        WatchConfig::new().watch_permission_changes(),
        None,
        true,
        |root| create_file(root, "file"),
        |root| {
            let path = root.join("file");
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_readonly(true);
            fs::set_permissions(&path, perms).unwrap();
        },
        &[ChangeEvent::new(ChangeKind::NonRemove, "file")],
    )
    .await;
}

#[tokio::test]
async fn test_cancellation_stops_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    let cancel = CancellationToken::new();
    let events = watch(
        &root,
        Arc::new(NameMatcher(None)),
        cancel.clone(),
        WatchConfig::new(),
    )
    .unwrap();

    cancel.cancel();
    timeout(SHUTDOWN_TIMEOUT, async {
        while events.recv().await.is_ok() {}
    })
    .await
    .expect("stream did not close after cancellation");

    // The backend is gone: further changes must not resurrect the stream.
    create_file(&root, "late");
    sleep(Duration::from_millis(300)).await;
    assert!(events.recv().await.is_err());
}

#[tokio::test]
async fn test_missing_root_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let result = watch(
        &missing,
        Arc::new(NameMatcher(None)),
        CancellationToken::new(),
        WatchConfig::new(),
    );
    assert!(matches!(result, Err(WatcherError::NotADirectory(_))));
}

#[tokio::test]
async fn test_file_root_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    create_file(&root, "file");

    let result = watch(
        root.join("file"),
        Arc::new(NameMatcher(None)),
        CancellationToken::new(),
        WatchConfig::new(),
    );
    assert!(matches!(result, Err(WatcherError::NotADirectory(_))));
}
