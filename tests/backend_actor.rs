//! Command/event round trips through a spawned backend worker.

mod common;

use common::{Behaviour, FakeProvider};
use mediaqueue::backend::{BackendEvent, BackendHandle};
use mediaqueue::catalog::ResolutionTag;
use mediaqueue::queue::{DownloadOrchestrator, ItemStatus};
use mediaqueue::MediaQueueError;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

const A: &str = "https://example.com/watch?v=a";
const B: &str = "https://example.com/watch?v=b";

/// Next event matching `pred`, skipping the rest
async fn wait_for<F>(events: &mut UnboundedReceiver<BackendEvent>, mut pred: F) -> BackendEvent
where
    F: FnMut(&BackendEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("backend alive");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event in time")
}

#[tokio::test]
async fn add_run_and_remove_through_handle() {
    let temp = TempDir::new().expect("temp dir");
    let provider = Arc::new(
        FakeProvider::new()
            .with_media(A, "Clip A", Behaviour::Succeed)
            .with_media(B, "Clip B", Behaviour::Succeed),
    );
    let orchestrator = DownloadOrchestrator::new(temp.path(), None);
    let (handle, mut events) = BackendHandle::spawn_with(provider.clone(), orchestrator);

    handle.fetch_catalog(A).await.expect("sent");
    let ready = wait_for(&mut events, |e| matches!(e, BackendEvent::CatalogReady { .. })).await;
    if let BackendEvent::CatalogReady { title, options, .. } = ready {
        assert_eq!(title, "Clip A");
        assert_eq!(options.len(), 3);
    }

    // cached catalog, then an uncached one
    handle.add(A, Some("720p".to_string())).await.expect("sent");
    handle.add(B, Some("2160p".to_string())).await.expect("sent");

    let first = wait_for(&mut events, |e| matches!(e, BackendEvent::ItemAdded(_))).await;
    let second = wait_for(&mut events, |e| matches!(e, BackendEvent::ItemAdded(_))).await;
    match (first, second) {
        (BackendEvent::ItemAdded(a), BackendEvent::ItemAdded(b)) => {
            assert_eq!(a.chosen_option.resolution_tag, ResolutionTag::Height(720));
            // unknown selection falls back to the first option
            assert_eq!(b.chosen_option.resolution_tag, ResolutionTag::Highest);
        }
        other => panic!("unexpected events: {:?}", other),
    }

    handle.add(A, Some("480p".to_string())).await.expect("sent");
    let rejected = wait_for(&mut events, |e| matches!(e, BackendEvent::Rejected { .. })).await;
    if let BackendEvent::Rejected { url, reason } = rejected {
        assert_eq!(url.as_deref(), Some(A));
        assert!(reason.contains("already in the queue"));
    }

    handle.run_queue().await.expect("sent");
    let finished = wait_for(&mut events, |e| matches!(e, BackendEvent::RunFinished(_))).await;
    if let BackendEvent::RunFinished(summary) = finished {
        assert_eq!(summary.completed, 2);
    }
    assert!(handle
        .snapshot()
        .iter()
        .all(|item| item.status == ItemStatus::Play));
    // A's catalog was cached, so only downloads hit the provider twice
    assert_eq!(provider.downloads().len(), 2);

    handle.remove(A).await.expect("sent");
    wait_for(&mut events, |e| matches!(e, BackendEvent::ItemRemoved { .. })).await;
    handle.clear().await.expect("sent");
    let cleared = wait_for(&mut events, |e| matches!(e, BackendEvent::QueueCleared { .. })).await;
    if let BackendEvent::QueueCleared { count } = cleared {
        assert_eq!(count, 1);
    }
    assert!(handle.snapshot().is_empty());

    handle.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn add_without_selection_is_rejected() {
    let temp = TempDir::new().expect("temp dir");
    let provider = Arc::new(FakeProvider::new().with_media(A, "Clip A", Behaviour::Succeed));
    let (handle, mut events) =
        BackendHandle::spawn_with(provider, DownloadOrchestrator::new(temp.path(), None));

    handle.add(A, None).await.expect("sent");
    let rejected = wait_for(&mut events, |e| matches!(e, BackendEvent::Rejected { .. })).await;
    if let BackendEvent::Rejected { reason, .. } = rejected {
        assert_eq!(reason, MediaQueueError::MissingSelection.to_string());
    }
    assert!(handle.snapshot().is_empty());

    handle.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn add_of_unknown_url_reports_catalog_failure() {
    let temp = TempDir::new().expect("temp dir");
    let provider = Arc::new(FakeProvider::new());
    let (handle, mut events) =
        BackendHandle::spawn_with(provider, DownloadOrchestrator::new(temp.path(), None));

    handle.add("https://example.com/nope", Some("highest".to_string())).await.expect("sent");
    let failed = wait_for(&mut events, |e| matches!(e, BackendEvent::CatalogFailed { .. })).await;
    if let BackendEvent::CatalogFailed { url, .. } = failed {
        assert_eq!(url, "https://example.com/nope");
    }

    handle.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn cancel_reaches_a_running_queue() {
    let temp = TempDir::new().expect("temp dir");
    let orchestrator = DownloadOrchestrator::new(temp.path(), None);
    let provider = Arc::new(
        FakeProvider::new()
            .with_media(A, "Clip A", Behaviour::CancelMidway(orchestrator.cancel_switch()))
            .with_media(B, "Clip B", Behaviour::Succeed),
    );
    let (handle, mut events) = BackendHandle::spawn_with(provider.clone(), orchestrator);

    handle.add(A, Some("highest".to_string())).await.expect("sent");
    handle.add(B, Some("highest".to_string())).await.expect("sent");
    handle.run_queue().await.expect("sent");

    let finished = wait_for(&mut events, |e| matches!(e, BackendEvent::RunFinished(_))).await;
    if let BackendEvent::RunFinished(summary) = finished {
        assert!(summary.canceled);
    }
    assert_eq!(provider.downloads(), vec![A.to_string()]);

    let snapshot = handle.snapshot();
    assert_eq!(snapshot[0].status, ItemStatus::Canceled);
    assert_eq!(snapshot[1].status, ItemStatus::Ready);

    handle.shutdown().await.expect("clean shutdown");
}
