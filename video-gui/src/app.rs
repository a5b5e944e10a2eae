use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use video_core::{AppConfig, FeedController, FeedEvent, FeedSnapshot};

use crate::list::{PressHandler, VideoList};
use crate::theme::Palette;

// Liens sociaux affichés dans l'en-tête
struct SocialLink {
    label: &'static str,
    url: &'static str,
    icon: &'static str,
}

const SOCIAL_LINKS: &[SocialLink] = &[
    SocialLink {
        label: "YouTube",
        url: "https://www.youtube.com/@FranceMemeL",
        icon: "https://img.icons8.com/ios-filled/50/FFFFFF/youtube-play.png",
    },
    SocialLink {
        label: "X",
        url: "https://x.com/FranceMemeL",
        icon: "https://img.icons8.com/ios-filled/50/FFFFFF/twitterx--v1.png",
    },
    SocialLink {
        label: "TikTok",
        url: "https://www.tiktok.com/@francememel",
        icon: "https://img.icons8.com/ios-filled/50/FFFFFF/tiktok--v1.png",
    },
];

pub struct AppInit {
    pub runtime: Arc<Runtime>,
    pub controller: FeedController,
    pub events: mpsc::Receiver<FeedEvent>,
    pub config: AppConfig,
}

pub struct VideoApp {
    runtime: Arc<Runtime>,
    controller: FeedController,
    events: mpsc::Receiver<FeedEvent>,
    feed: FeedSnapshot,
    list: VideoList,
    palette: Palette,
    style_applied: bool,
    launched_at: Instant,
    warmup: Duration,
}

impl VideoApp {
    /// `ctx` is woken up for every feed event so results show up without user input.
    pub fn new(init: AppInit, ctx: egui::Context) -> Self {
        let (ui_tx, ui_rx) = mpsc::channel(64);
        forward_events(init.runtime.handle(), init.events, ui_tx, move || {
            ctx.request_repaint()
        });
        let palette = Palette::from(&init.config.theme);
        let ui = &init.config.ui;
        let list = VideoList::new(
            ui.playback,
            ui.end_reached_threshold,
            ui.max_list_width,
            external_player(),
        );
        Self {
            runtime: init.runtime,
            controller: init.controller,
            events: ui_rx,
            feed: FeedSnapshot::default(),
            list,
            palette,
            style_applied: false,
            launched_at: Instant::now(),
            warmup: Duration::from_millis(ui.warmup_ms),
        }
    }

    fn refresh_updates(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "feed event");
            changed = true;
        }
        if changed {
            self.feed = self.runtime.block_on(self.controller.snapshot());
        }
    }

    fn draw_warmup(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.palette.header))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() / 2.0 - 60.0);
                    ui.add(egui::Spinner::new().size(40.0).color(self.palette.accent));
                    ui.add_space(24.0);
                    ui.label(RichText::new("INITIALIZING ENGINE").size(18.0).color(Color32::WHITE));
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("FRANCE MÈME LEGEND")
                            .size(12.0)
                            .color(Color32::from_white_alpha(153)),
                    );
                });
            });
    }

    fn draw_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.palette.header)
                    .inner_margin(egui::Margin::symmetric(20.0, 12.0))
                    .stroke(egui::Stroke::new(4.0, self.palette.accent)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(RichText::new("FRANCE MÈME").strong().size(20.0).color(Color32::WHITE));
                        ui.label(RichText::new("LEGEND").size(12.0).color(self.palette.accent));
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        for link in SOCIAL_LINKS.iter().rev() {
                            let icon = egui::Image::new(link.icon)
                                .fit_to_exact_size(egui::vec2(24.0, 24.0))
                                .tint(Color32::WHITE);
                            let response = ui
                                .add(egui::ImageButton::new(icon).frame(false))
                                .on_hover_text(format!("Visit us on {}", link.label));
                            if response.clicked() {
                                if let Err(err) = webbrowser::open(link.url) {
                                    warn!(error = %err, url = link.url, "couldn't open page");
                                }
                            }
                        }
                    });
                });
            });
    }

    fn draw_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer")
            .frame(
                egui::Frame::none()
                    .fill(self.palette.header)
                    .inner_margin(egui::Margin::same(16.0)),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 4.0;
                        ui.label(RichText::new("Fait en râlant par").size(14.0).color(Color32::WHITE));
                        ui.hyperlink_to(
                            RichText::new("Gokai Labs").strong().color(self.palette.accent),
                            "https://gokai.org/",
                        );
                    });
                });
            });
    }

    fn draw_content(&mut self, ctx: &egui::Context) {
        let palette = self.palette;
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = self.feed.error.clone() {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() / 2.0 - 40.0);
                    ui.label(RichText::new(error).strong().size(16.0).color(palette.accent));
                    ui.add_space(12.0);
                    if ui
                        .add_enabled(!self.feed.is_loading, egui::Button::new("Réessayer"))
                        .clicked()
                    {
                        self.controller.spawn_refresh();
                        ui.ctx().request_repaint();
                    }
                });
                return;
            }

            let request = self.list.show(ui, &self.feed, &palette);
            if request.refresh {
                info!("refresh requested");
                self.controller.spawn_refresh();
                ui.ctx().request_repaint();
            } else if request.load_more {
                debug!("end of list reached, loading more");
                self.controller.spawn_load_more();
                ui.ctx().request_repaint();
            }
        });
    }
}

/// Relaie les événements du contrôleur vers l'interface et la réveille à chaque événement
pub fn forward_events(
    runtime: &Handle,
    mut events: mpsc::Receiver<FeedEvent>,
    ui_tx: mpsc::Sender<FeedEvent>,
    wake: impl Fn() + Send + 'static,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        while let Some(event) = events.recv().await {
            if ui_tx.send(event).await.is_err() {
                debug!("ui event receiver dropped");
                break;
            }
            wake();
        }
    })
}

// Lecture déléguée au lecteur externe (navigateur)
fn external_player() -> PressHandler {
    Box::new(|id: &str| {
        let url = format!("https://www.youtube.com/watch?v={id}");
        info!(video = id, "playing video");
        if let Err(err) = webbrowser::open(&url) {
            warn!(error = %err, video = id, "failed to open video");
        }
    })
}

impl Drop for VideoApp {
    fn drop(&mut self) {
        self.runtime.block_on(self.controller.close());
    }
}

impl eframe::App for VideoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.style_applied {
            self.palette.apply(ctx);
            self.style_applied = true;
        }
        self.refresh_updates();

        let elapsed = self.launched_at.elapsed();
        if elapsed < self.warmup {
            self.draw_warmup(ctx);
            ctx.request_repaint_after(self.warmup - elapsed);
            return;
        }

        self.draw_header(ctx);
        self.draw_footer(ctx);
        self.draw_content(ctx);
    }
}
