mod app;
mod item;
mod list;
mod theme;

use std::sync::Arc;
use std::time::Duration;

use eframe::{egui, NativeOptions};
use reqwest::{redirect, ClientBuilder};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::EnvFilter;
use video_core::{source_from_config, AppConfig, FeedController, PlaceholderSource, VideoSource};

use crate::app::{AppInit, VideoApp};

fn main() -> eframe::Result<()> {
    init_tracing();

    let runtime = Arc::new(Runtime::new().expect("failed to initialise Tokio runtime"));
    let config = AppConfig::load();
    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent("VideoFeed/0.1")
        .build()
        .expect("failed to build HTTP client");
    let source = build_source(&config, client);
    let (event_tx, event_rx) = mpsc::channel(64);

    let controller = {
        let _guard = runtime.enter();
        FeedController::start(source, event_tx)
    };

    let init = AppInit {
        runtime: runtime.clone(),
        controller,
        events: event_rx,
        config,
    };

    eframe::run_native(
        "France Mème Legend",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([900.0, 900.0])
                .with_min_inner_size([480.0, 500.0]),
            ..Default::default()
        },
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Box::new(VideoApp::new(init, cc.egui_ctx.clone()))
        }),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn build_source(config: &AppConfig, client: reqwest::Client) -> Arc<dyn VideoSource> {
    match source_from_config(&config.api, client) {
        Ok(source) => source,
        Err(err) => {
            error!(error = %err, "invalid API configuration, falling back to placeholder data");
            Arc::new(PlaceholderSource::new(Duration::from_millis(
                config.api.placeholder_delay_ms,
            )))
        }
    }
}
