//! Event channel and stream loop tests through the public library API

use async_trait::async_trait;
use books_api::books::{BookManager, BookRequest, InMemoryBookStore};
use books_api::events::{
    Event, EventChannel, EventEmitter, EventSink, RecvError, SinkError, StreamExit, StreamLoop,
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const WAIT: Duration = Duration::from_secs(3);

fn request(title: &str) -> BookRequest {
    BookRequest {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        published_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
        summary: "Spice".to_string(),
        genre: "Science Fiction".to_string(),
    }
}

/// Sink collecting forwarded descriptions; fails once `fail_after` events went through
#[derive(Clone, Default)]
struct CollectSink {
    seen: Arc<Mutex<Vec<String>>>,
    fail_after: Option<usize>,
}

#[async_trait]
impl EventSink for CollectSink {
    async fn forward(&mut self, event: Event) -> Result<(), SinkError> {
        let mut seen = self.seen.lock().unwrap();
        if self.fail_after.is_some_and(|n| seen.len() >= n) {
            return Err(SinkError::Disconnected);
        }
        seen.push(event.into_string());
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn test_fifo_then_timeout_scenario() {
    let channel = EventChannel::new();
    channel.emit(Event::new("A"));
    channel.emit(Event::new("B"));

    assert_eq!(channel.pop(WAIT).await.unwrap().as_str(), "A");
    assert_eq!(channel.pop(WAIT).await.unwrap().as_str(), "B");

    let started = tokio::time::Instant::now();
    assert_eq!(channel.pop(WAIT).await, Err(RecvError::TimedOut));
    assert!(started.elapsed() >= WAIT);
}

#[tokio::test]
async fn test_crud_mutations_reach_the_stream_in_commit_order() {
    let channel = Arc::new(EventChannel::new());
    let manager = BookManager::new(Arc::new(InMemoryBookStore::new()), channel.clone());

    let dune = manager.create_book(request("Dune")).await.unwrap();
    manager
        .update_book(dune.id, request("Dune Messiah"))
        .await
        .unwrap()
        .unwrap();
    assert!(manager.delete_book(dune.id).await.unwrap());
    // Failed mutations emit nothing
    assert!(!manager.delete_book(dune.id).await.unwrap());
    assert!(manager
        .update_book(999, request("Ghost"))
        .await
        .unwrap()
        .is_none());

    let sink = CollectSink::default();
    let seen = sink.seen.clone();
    let cancel = CancellationToken::new();
    let consumer = channel.try_consumer().unwrap();
    let handle = tokio::spawn(
        StreamLoop::with_timeout(consumer, sink, Duration::from_millis(20), cancel.clone()).run(),
    );

    tokio::time::timeout(Duration::from_secs(2), async {
        while seen.lock().unwrap().len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    cancel.cancel();

    let summary = handle.await.unwrap();
    assert_eq!(summary.exit, StreamExit::Cancelled);
    assert_eq!(summary.forwarded, 3);

    let seen = seen.lock().unwrap().clone();
    assert!(seen[0].contains("Dune") && seen[0].contains("created"));
    assert!(seen[1].contains("Dune Messiah") && seen[1].contains("updated"));
    assert!(seen[2].contains("deleted"));
    assert!(!channel.is_streaming());
}

#[tokio::test(start_paused = true)]
async fn test_failed_sink_ends_loop_and_next_stream_resumes() {
    let channel = EventChannel::new();
    for name in ["one", "two", "three"] {
        channel.emit(Event::new(name));
    }

    let broken = CollectSink {
        fail_after: Some(1),
        ..Default::default()
    };
    let summary = StreamLoop::new(
        channel.try_consumer().unwrap(),
        broken.clone(),
        CancellationToken::new(),
    )
    .run()
    .await;
    assert_eq!(summary.exit, StreamExit::SinkClosed(SinkError::Disconnected));
    assert_eq!(summary.forwarded, 1);
    assert_eq!(*broken.seen.lock().unwrap(), vec!["one"]);

    // "two" was lost with the failed write; "three" is still queued
    let fresh = CollectSink::default();
    let cancel = CancellationToken::new();
    let mut stream = StreamLoop::new(channel.try_consumer().unwrap(), fresh.clone(), cancel);
    assert!(stream.step().await.is_none());
    assert!(stream.step().await.is_none());
    assert_eq!(*fresh.seen.lock().unwrap(), vec!["three"]);
}

#[tokio::test]
async fn test_push_after_close_is_dropped_silently() {
    let channel = EventChannel::new();
    channel.close().await;
    assert!(channel.is_closed());

    // Emitting never fails the caller
    channel.emit(Event::new("lost"));
    assert!(channel.push(Event::new("lost")).is_err());
}
