use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::{mpsc, Notify};
use video_core::{
    FeedController, FeedEvent, FetchError, FetchKind, Page, PlaceholderSource, VideoRecord,
    VideoSource, FETCH_FAILED_MESSAGE,
};

fn page(prefix: &str, count: usize, cursor: Option<&str>) -> Page {
    Page {
        records: (0..count)
            .map(|i| VideoRecord {
                id: format!("{prefix}-{i}"),
                title: format!("{prefix} video {i}"),
                thumbnail_url: format!("https://img.example/{prefix}/{i}.jpg"),
                published_at: "2024-01-05T10:00:00Z".into(),
            })
            .collect(),
        next_cursor: cursor.map(str::to_owned),
    }
}

fn failure() -> FetchError {
    FetchError::Status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Replays queued results in order and records the cursor of every call.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Page, FetchError>>>,
    calls: Mutex<Vec<Option<String>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Page, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoSource for ScriptedSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page, FetchError> {
        self.calls.lock().unwrap().push(cursor.map(str::to_owned));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected fetch")
    }
}

/// Blocks every fetch until the test releases it.
struct GatedSource {
    entered: Notify,
    release: Notify,
    calls: AtomicUsize,
    page: Page,
}

impl GatedSource {
    fn new(page: Page) -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            release: Notify::new(),
            calls: AtomicUsize::new(0),
            page,
        })
    }
}

#[async_trait]
impl VideoSource for GatedSource {
    async fn fetch_page(&self, _cursor: Option<&str>) -> Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.page.clone())
    }
}

fn ids(videos: &[VideoRecord]) -> Vec<String> {
    videos.iter().map(|v| v.id.clone()).collect()
}

#[tokio::test]
async fn load_more_appends_pages_in_arrival_order() {
    let source = ScriptedSource::new(vec![
        Ok(page("p1", 20, Some("PAGE2"))),
        Ok(page("p2", 20, Some("PAGE3"))),
        Ok(page("p3", 5, None)),
    ]);
    let controller = FeedController::new(source.clone());

    assert!(controller.refresh().await);
    assert!(controller.load_more().await);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.videos.len(), 40);
    let mut expected = ids(&page("p1", 20, None).records);
    expected.extend(ids(&page("p2", 20, None).records));
    assert_eq!(ids(&snapshot.videos), expected);
    assert!(snapshot.has_more);

    assert!(controller.load_more().await);
    let snapshot = controller.snapshot().await;
    expected.extend(ids(&page("p3", 5, None).records));
    assert_eq!(ids(&snapshot.videos), expected);
    assert!(!snapshot.has_more);
    assert!(!snapshot.is_loading);

    assert_eq!(
        source.calls(),
        vec![None, Some("PAGE2".into()), Some("PAGE3".into())]
    );
}

#[tokio::test]
async fn duplicate_ids_across_pages_are_kept() {
    let source = ScriptedSource::new(vec![
        Ok(page("dup", 3, Some("NEXT"))),
        Ok(page("dup", 3, None)),
    ]);
    let controller = FeedController::new(source);

    controller.refresh().await;
    controller.load_more().await;

    assert_eq!(controller.snapshot().await.videos.len(), 6);
}

#[tokio::test]
async fn refresh_replaces_items_even_at_end_of_feed() {
    let source = ScriptedSource::new(vec![
        Ok(page("old", 20, Some("PAGE2"))),
        Ok(page("older", 10, None)),
        Ok(page("new", 3, Some("FRESH2"))),
    ]);
    let controller = FeedController::new(source.clone());

    controller.refresh().await;
    controller.load_more().await;
    assert!(!controller.snapshot().await.has_more);

    assert!(controller.refresh().await);
    let snapshot = controller.snapshot().await;
    assert_eq!(ids(&snapshot.videos), ids(&page("new", 3, None).records));
    assert!(snapshot.has_more);
    assert_eq!(source.calls().last(), Some(&None), "refresh ignores the stored cursor");
}

#[tokio::test]
async fn load_more_without_cursor_is_a_no_op() {
    let source = ScriptedSource::new(vec![Ok(page("only", 4, None))]);
    let controller = FeedController::new(source.clone());

    assert!(!controller.load_more().await, "nothing loaded yet, no cursor");
    assert!(source.calls().is_empty());

    controller.refresh().await;
    let before = controller.snapshot().await;

    assert!(!controller.load_more().await);
    assert_eq!(controller.snapshot().await, before);
    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn placeholder_feed_ends_after_first_page() {
    let controller = FeedController::new(Arc::new(PlaceholderSource::new(Duration::ZERO)));

    assert!(controller.refresh().await);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.videos.len(), 20);
    assert_eq!(snapshot.videos[0].id, "mock-0");
    assert_eq!(snapshot.videos[19].id, "mock-19");
    assert!(!snapshot.has_more);

    assert!(!controller.load_more().await);
    assert_eq!(controller.snapshot().await, snapshot);
}

#[tokio::test]
async fn calls_while_loading_are_dropped() {
    let source = GatedSource::new(page("p1", 20, Some("PAGE2")));
    let controller = FeedController::new(source.clone());

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    source.entered.notified().await;

    let during = controller.snapshot().await;
    assert!(during.is_loading);
    assert!(during.videos.is_empty());
    assert!(!during.is_refreshing(), "initial load is not a refresh");

    assert!(!controller.refresh().await);
    assert!(!controller.load_more().await);
    assert_eq!(controller.snapshot().await, during, "ignored calls leave state untouched");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    source.release.notify_one();
    assert!(first.await.unwrap());

    let after = controller.snapshot().await;
    assert!(!after.is_loading);
    assert_eq!(after.videos.len(), 20);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_content_and_clears_loading() {
    let source = ScriptedSource::new(vec![
        Ok(page("p1", 20, Some("PAGE2"))),
        Err(failure()),
        Ok(page("p2", 5, None)),
    ]);
    let controller = FeedController::new(source);

    controller.refresh().await;
    let before = controller.snapshot().await;

    assert!(controller.refresh().await);
    let failed = controller.snapshot().await;
    assert_eq!(failed.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(failed.videos, before.videos);
    assert!(failed.has_more);
    assert!(!failed.is_loading);

    // The next attempt clears the error before running.
    assert!(controller.refresh().await);
    let recovered = controller.snapshot().await;
    assert!(recovered.error.is_none());
    assert_eq!(recovered.videos.len(), 5);
}

#[tokio::test]
async fn failed_load_more_keeps_cursor_for_a_later_retry() {
    let source = ScriptedSource::new(vec![
        Ok(page("p1", 20, Some("PAGE2"))),
        Err(failure()),
        Ok(page("p2", 20, None)),
    ]);
    let controller = FeedController::new(source.clone());

    controller.refresh().await;
    assert!(controller.load_more().await);

    let failed = controller.snapshot().await;
    assert_eq!(failed.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(failed.videos.len(), 20);
    assert!(failed.has_more);
    assert!(!failed.is_loading);

    assert!(controller.load_more().await);
    let retried = controller.snapshot().await;
    assert!(retried.error.is_none());
    assert_eq!(retried.videos.len(), 40);
    assert_eq!(
        source.calls(),
        vec![None, Some("PAGE2".into()), Some("PAGE2".into())]
    );
}

#[tokio::test]
async fn completion_after_close_is_discarded() {
    let source = GatedSource::new(page("late", 20, Some("PAGE2")));
    let controller = FeedController::new(source.clone());

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    source.entered.notified().await;

    controller.close().await;
    source.release.notify_one();
    assert!(pending.await.unwrap());

    let snapshot = controller.snapshot().await;
    assert!(snapshot.videos.is_empty());
    assert!(!snapshot.has_more);
    assert!(snapshot.error.is_none());

    assert!(!controller.refresh().await, "closed controller ignores requests");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn events_follow_each_attempt() {
    let source = ScriptedSource::new(vec![Ok(page("p1", 2, Some("PAGE2"))), Err(failure())]);
    let (tx, mut rx) = mpsc::channel(16);
    let controller = FeedController::with_events(source, tx);

    controller.refresh().await;
    controller.load_more().await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![
            FeedEvent::Started(FetchKind::Refresh),
            FeedEvent::Loaded {
                kind: FetchKind::Refresh,
                received: 2,
                has_more: true,
            },
            FeedEvent::Started(FetchKind::LoadMore),
            FeedEvent::Failed {
                kind: FetchKind::LoadMore,
                message: FETCH_FAILED_MESSAGE.to_owned(),
            },
        ]
    );
}

#[tokio::test]
async fn start_issues_the_initial_load() {
    let source = ScriptedSource::new(vec![Ok(page("init", 20, Some("PAGE2")))]);
    let (tx, mut rx) = mpsc::channel(16);
    let controller = FeedController::start(source.clone(), tx);

    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed");
        if matches!(event, FeedEvent::Loaded { .. }) {
            break;
        }
    }

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.videos.len(), 20);
    assert_eq!(source.calls(), vec![None]);
}
