use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::video::{Page, SearchResponse, VideoRecord};

/// Number of records served by [`PlaceholderSource`].
pub const PLACEHOLDER_COUNT: usize = 20;

/// Anything able to hand out one page of channel videos.
///
/// `cursor` is the continuation token of a previous page; `None` asks for the first page.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page, FetchError>;
}

/// Client for the video platform `search` endpoint, scoped to one channel.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    search_url: Url,
    channel_id: String,
    api_key: String,
    page_size: u32,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(client: Client, config: &ApiConfig, api_key: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            search_url: config.search_url()?,
            channel_id: config.channel_id.clone(),
            api_key: api_key.into(),
            page_size: config.page_size,
            timeout: config.request_timeout(),
        })
    }
}

#[async_trait]
impl VideoSource for SearchClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page, FetchError> {
        let mut query: Vec<(&str, String)> = vec![
            ("part", "snippet".to_owned()),
            ("channelId", self.channel_id.clone()),
            ("type", "video".to_owned()),
            ("maxResults", self.page_size.to_string()),
            ("order", "date".to_owned()),
            ("key", self.api_key.clone()),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token.to_owned()));
        }

        debug!(channel = %self.channel_id, cursor = ?cursor, "requesting video page");
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        let body: SearchResponse = serde_json::from_slice(&bytes)?;
        let page = Page::from_response(body)?;
        debug!(
            received = page.records.len(),
            has_more = page.next_cursor.is_some(),
            "video page received"
        );
        Ok(page)
    }
}

/// Fixed demo dataset used when no credential is configured.
#[derive(Debug, Clone)]
pub struct PlaceholderSource {
    records: Vec<VideoRecord>,
    delay: Duration,
}

impl PlaceholderSource {
    pub fn new(delay: Duration) -> Self {
        let published_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let records = (0..PLACEHOLDER_COUNT)
            .map(|i| VideoRecord {
                id: format!("mock-{i}"),
                title: format!("France Meme Video {}", i + 1),
                thumbnail_url: format!("https://picsum.photos/seed/{i}/480/360"),
                published_at: published_at.clone(),
            })
            .collect();
        Self { records, delay }
    }
}

#[async_trait]
impl VideoSource for PlaceholderSource {
    async fn fetch_page(&self, _cursor: Option<&str>) -> Result<Page, FetchError> {
        warn!("no API key provided, returning placeholder videos");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Page {
            records: self.records.clone(),
            next_cursor: None,
        })
    }
}

/// Picks the real search client when a credential is configured, the placeholder otherwise.
pub fn source_from_config(
    config: &ApiConfig,
    client: Client,
) -> Result<Arc<dyn VideoSource>, FetchError> {
    match config.credential() {
        Some(key) => {
            info!(channel = %config.channel_id, "using video search API");
            Ok(Arc::new(SearchClient::new(client, config, key)?))
        }
        None => {
            info!("no usable API key configured, falling back to placeholder data");
            Ok(Arc::new(PlaceholderSource::new(config.placeholder_delay())))
        }
    }
}
