use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// A single video as the feed knows it, independent of the upstream API shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: String,
    /// Raw title; may still carry HTML entities.
    pub title: String,
    pub thumbnail_url: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub published_at: String,
}

/// One page returned by a [`crate::VideoSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<VideoRecord>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: String,
    pub published_at: String,
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl VideoRecord {
    pub fn from_search_item(item: &SearchItem) -> Result<Self, FetchError> {
        let id = item
            .id
            .video_id
            .clone()
            .ok_or(FetchError::MissingField("id.videoId"))?;
        let thumbnail = item
            .snippet
            .thumbnails
            .high
            .as_ref()
            .ok_or(FetchError::MissingField("snippet.thumbnails.high"))?;

        Ok(Self {
            id,
            title: item.snippet.title.clone(),
            thumbnail_url: thumbnail.url.clone(),
            published_at: item.snippet.published_at.clone(),
        })
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}?autoplay=1", self.id)
    }
}

impl Page {
    pub fn from_response(response: SearchResponse) -> Result<Self, FetchError> {
        let records = response
            .items
            .iter()
            .map(VideoRecord::from_search_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            records,
            next_cursor: response.next_page_token,
        })
    }
}
