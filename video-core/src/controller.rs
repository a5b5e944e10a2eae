//! Feed state and the single-flight pagination logic around a [`VideoSource`].
//!
//! The controller owns one [`FeedState`]. Only `refresh` and `load_more` mutate it, and at
//! most one fetch is outstanding at a time: calls made while a fetch is running are
//! dropped, not queued. Every attempt carries a generation number so that a completion
//! arriving after [`FeedController::close`] is discarded.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::VideoSource;
use crate::video::VideoRecord;

/// The only error message the feed ever shows.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load videos. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Refresh,
    LoadMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Started(FetchKind),
    Loaded {
        kind: FetchKind,
        received: usize,
        has_more: bool,
    },
    Failed {
        kind: FetchKind,
        message: String,
    },
}

/// Read-only copy of the feed handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub videos: Vec<VideoRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
}

impl FeedSnapshot {
    /// A reload of content already on screen, as opposed to the first load.
    pub fn is_refreshing(&self) -> bool {
        self.is_loading && !self.videos.is_empty()
    }

    pub fn is_empty_idle(&self) -> bool {
        !self.is_loading && self.videos.is_empty()
    }
}

#[derive(Debug, Default)]
struct FeedState {
    items: Vec<VideoRecord>,
    is_loading: bool,
    error: Option<String>,
    cursor: Option<String>,
    generation: u64,
    closed: bool,
}

struct Shared {
    source: Arc<dyn VideoSource>,
    state: RwLock<FeedState>,
    events: Option<mpsc::Sender<FeedEvent>>,
}

#[derive(Clone)]
pub struct FeedController {
    shared: Arc<Shared>,
    runtime: Option<Handle>,
}

impl FeedController {
    /// Empty, idle controller. No fetch is issued until asked.
    pub fn new(source: Arc<dyn VideoSource>) -> Self {
        Self::build(source, None)
    }

    pub fn with_events(source: Arc<dyn VideoSource>, events: mpsc::Sender<FeedEvent>) -> Self {
        Self::build(source, Some(events))
    }

    /// Creates the controller and kicks off the initial load in the background.
    ///
    /// Must be called from within a Tokio runtime; later `spawn_*` calls reuse it.
    pub fn start(source: Arc<dyn VideoSource>, events: mpsc::Sender<FeedEvent>) -> Self {
        let controller = Self::with_events(source, events);
        controller.spawn_refresh();
        controller
    }

    fn build(source: Arc<dyn VideoSource>, events: Option<mpsc::Sender<FeedEvent>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                state: RwLock::new(FeedState::default()),
                events,
            }),
            runtime: Handle::try_current().ok(),
        }
    }

    /// Reloads the feed from the first page and replaces the current items.
    ///
    /// Returns `false` without touching anything when a fetch is already running.
    pub async fn refresh(&self) -> bool {
        self.run(FetchKind::Refresh).await
    }

    /// Appends the page after the stored cursor.
    ///
    /// Returns `false` when a fetch is running or the end of the feed was reached.
    pub async fn load_more(&self) -> bool {
        self.run(FetchKind::LoadMore).await
    }

    pub fn spawn_refresh(&self) -> Option<JoinHandle<bool>> {
        self.spawn(FetchKind::Refresh)
    }

    pub fn spawn_load_more(&self) -> Option<JoinHandle<bool>> {
        self.spawn(FetchKind::LoadMore)
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        let state = self.shared.state.read().await;
        FeedSnapshot {
            videos: state.items.clone(),
            is_loading: state.is_loading,
            error: state.error.clone(),
            has_more: state.cursor.is_some(),
        }
    }

    /// Detaches the controller from its owner. Later calls are no-ops and a
    /// fetch still in flight will not be applied.
    pub async fn close(&self) {
        let mut state = self.shared.state.write().await;
        if !state.closed {
            state.closed = true;
            state.generation += 1;
            debug!("feed controller closed");
        }
    }

    fn spawn(&self, kind: FetchKind) -> Option<JoinHandle<bool>> {
        let Some(runtime) = &self.runtime else {
            warn!(?kind, "no runtime attached to feed controller, ignoring request");
            return None;
        };
        let this = self.clone();
        Some(runtime.spawn(async move { this.fetch(kind).await }))
    }

    // The fetch runs in its own task so that dropping the caller's future cannot
    // leave the feed stuck in the loading state.
    async fn run(&self, kind: FetchKind) -> bool {
        let this = self.clone();
        match tokio::spawn(async move { this.fetch(kind).await }).await {
            Ok(issued) => issued,
            Err(err) => {
                warn!(error = %err, ?kind, "feed fetch task failed");
                false
            }
        }
    }

    async fn fetch(&self, kind: FetchKind) -> bool {
        let (generation, cursor) = {
            let mut state = self.shared.state.write().await;
            if state.closed || state.is_loading {
                debug!(?kind, "fetch already in flight, ignoring request");
                return false;
            }
            let cursor = match kind {
                FetchKind::Refresh => None,
                FetchKind::LoadMore => match state.cursor.clone() {
                    Some(cursor) => Some(cursor),
                    None => {
                        debug!("end of feed reached, nothing more to load");
                        return false;
                    }
                },
            };
            state.is_loading = true;
            state.error = None;
            state.generation += 1;
            (state.generation, cursor)
        };
        self.emit(FeedEvent::Started(kind));

        let result = self.shared.source.fetch_page(cursor.as_deref()).await;

        let event = {
            let mut state = self.shared.state.write().await;
            if state.closed || state.generation != generation {
                debug!(generation, "discarding stale fetch completion");
                return true;
            }
            state.is_loading = false;
            match result {
                Ok(page) => {
                    let received = page.records.len();
                    match kind {
                        FetchKind::Refresh => state.items = page.records,
                        FetchKind::LoadMore => state.items.extend(page.records),
                    }
                    state.cursor = page.next_cursor;
                    info!(
                        ?kind,
                        received,
                        total = state.items.len(),
                        has_more = state.cursor.is_some(),
                        "videos loaded"
                    );
                    FeedEvent::Loaded {
                        kind,
                        received,
                        has_more: state.cursor.is_some(),
                    }
                }
                Err(err) => {
                    warn!(error = %err, ?kind, "failed to fetch videos");
                    state.error = Some(FETCH_FAILED_MESSAGE.to_owned());
                    FeedEvent::Failed {
                        kind,
                        message: FETCH_FAILED_MESSAGE.to_owned(),
                    }
                }
            }
        };
        self.emit(event);
        true
    }

    fn emit(&self, event: FeedEvent) {
        if let Some(tx) = &self.shared.events {
            if let Err(err) = tx.try_send(event) {
                debug!(error = %err, "feed event not delivered");
            }
        }
    }
}
