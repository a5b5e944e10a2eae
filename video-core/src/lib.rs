pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod text;
pub mod video;

pub use client::{source_from_config, PlaceholderSource, SearchClient, VideoSource, PLACEHOLDER_COUNT};
pub use config::{ApiConfig, AppConfig, PlaybackMode, ThemeConfig, UiConfig};
pub use controller::{FeedController, FeedEvent, FeedSnapshot, FetchKind, FETCH_FAILED_MESSAGE};
pub use error::{ConfigError, FetchError};
pub use video::{Page, VideoRecord};
