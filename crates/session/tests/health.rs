//! Tests for the reader health monitor

mod common;

use std::sync::Arc;
use std::time::Duration;

use tagrelay_pcsc::mock::MockSubsystem;
use tagrelay_pcsc::{PcscError, ReaderDevice};
use tagrelay_session::ReaderHealthMonitor;
use tokio_util::sync::CancellationToken;
use tracing::Span;

fn monitor(mock: &MockSubsystem) -> ReaderHealthMonitor<MockSubsystem> {
    ReaderHealthMonitor::new(
        Arc::new(mock.clone()),
        ReaderDevice::new("Reader A"),
        Duration::from_millis(10),
        Span::none(),
    )
}

#[tokio::test]
async fn test_cancels_when_reader_is_gone() {
    let mock = MockSubsystem::new().with_readers(["Reader A", "Reader B"]);
    let parent = CancellationToken::new();
    let (scope, handle) = monitor(&mock).spawn(&parent);

    assert!(common::eventually(|| mock.list_calls() >= 3).await);
    assert!(!scope.is_cancelled());

    mock.set_readers(["Reader B"]);
    tokio::time::timeout(Duration::from_secs(2), scope.cancelled())
        .await
        .expect("scope should be cancelled once the reader is gone");
    handle.await.unwrap();
    assert!(!parent.is_cancelled());
}

#[tokio::test]
async fn test_enumeration_errors_do_not_cancel() {
    let mock = MockSubsystem::new().with_readers(["Reader A"]);
    for _ in 0..3 {
        mock.push_enumeration(Err(PcscError::other("service busy")));
    }
    let parent = CancellationToken::new();
    let (scope, handle) = monitor(&mock).spawn(&parent);

    assert!(common::eventually(|| mock.list_calls() >= 5).await);
    assert!(!scope.is_cancelled());

    parent.cancel();
    handle.await.unwrap();
    assert!(scope.is_cancelled());
}

#[tokio::test]
async fn test_first_check_after_one_interval() {
    let mock = MockSubsystem::new().with_readers(["Reader A"]);
    let parent = CancellationToken::new();
    let (_scope, handle) = ReaderHealthMonitor::new(
        Arc::new(mock.clone()),
        ReaderDevice::new("Reader A"),
        Duration::from_secs(60),
        Span::none(),
    )
    .spawn(&parent);

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(mock.list_calls(), 0);

    parent.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("monitor should stop with its parent")
        .unwrap();
}

#[tokio::test]
async fn test_empty_enumeration_cancels() {
    let mock = MockSubsystem::new().with_readers(["Reader A"]);
    mock.push_enumeration(Ok(Vec::new()));
    let parent = CancellationToken::new();
    let (scope, handle) = monitor(&mock).spawn(&parent);

    tokio::time::timeout(Duration::from_secs(2), scope.cancelled())
        .await
        .expect("scope should be cancelled");
    handle.await.unwrap();
    assert_eq!(mock.list_calls(), 1);
}
