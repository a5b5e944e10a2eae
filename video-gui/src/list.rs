use eframe::egui::{self, Align, Key, Layout, RichText};
use video_core::{FeedSnapshot, PlaybackMode};

use crate::item::{show_card, CardLayout};
use crate::theme::Palette;

/// Callback invoked with the video id when a card is pressed in external playback mode.
pub type PressHandler = Box<dyn Fn(&str)>;

const PULL_DISTANCE: f32 = 80.0;
const FOOTER_CAPTION: &str = "@FranceMemeL";

/// What the list asks its owner to do after a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub refresh: bool,
    pub load_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub viewport: f32,
    pub content: f32,
}

impl ScrollMetrics {
    pub fn remaining(&self) -> f32 {
        self.content - (self.offset + self.viewport)
    }
}

/// Fires once when the scroll position comes within `threshold` viewports of the end.
///
/// Re-arms when the content grows or shrinks, or when the user scrolls back out of the zone.
#[derive(Debug, Clone)]
pub struct EndReached {
    threshold: f32,
    fired_for: Option<f32>,
}

impl EndReached {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            fired_for: None,
        }
    }

    pub fn check(&mut self, metrics: ScrollMetrics, can_load: bool) -> bool {
        let within = metrics.remaining() <= self.threshold * metrics.viewport;
        if !within || self.fired_for.is_some_and(|content| content != metrics.content) {
            self.fired_for = None;
        }
        if !within || !can_load || self.fired_for.is_some() {
            return false;
        }
        self.fired_for = Some(metrics.content);
        true
    }
}

/// Turns upward scrolling past the top of the list into a refresh gesture.
#[derive(Debug, Clone)]
pub struct PullToRefresh {
    distance: f32,
    pulled: f32,
}

impl PullToRefresh {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            pulled: 0.0,
        }
    }

    /// `scroll_delta` follows egui: positive values scroll towards the top.
    pub fn update(&mut self, at_top: bool, scroll_delta: f32) -> bool {
        if !at_top || scroll_delta < 0.0 {
            self.pulled = 0.0;
            return false;
        }
        self.pulled += scroll_delta;
        if self.pulled >= self.distance {
            self.pulled = 0.0;
            return true;
        }
        false
    }

    pub fn progress(&self) -> f32 {
        (self.pulled / self.distance).clamp(0.0, 1.0)
    }
}

pub struct VideoList {
    playback: PlaybackMode,
    max_width: f32,
    end_reached: EndReached,
    pull: PullToRefresh,
    on_press: PressHandler,
}

impl VideoList {
    pub fn new(playback: PlaybackMode, threshold: f32, max_width: f32, on_press: PressHandler) -> Self {
        Self {
            playback,
            max_width,
            end_reached: EndReached::new(threshold),
            pull: PullToRefresh::new(PULL_DISTANCE),
            on_press,
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, feed: &FeedSnapshot, palette: &Palette) -> ListRequest {
        let mut request = ListRequest::default();

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{} vidéos", feed.videos.len()))
                    .size(13.0)
                    .color(palette.secondary_text),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let button = egui::Button::new("⟳ Rafraîchir");
                if ui
                    .add_enabled(!feed.is_loading, button)
                    .on_hover_text("Recharger depuis la première page (F5)")
                    .clicked()
                {
                    request.refresh = true;
                }
                if feed.is_refreshing() {
                    ui.add(egui::Spinner::new().size(16.0).color(palette.accent));
                    ui.label(RichText::new("Actualisation…").size(13.0).color(palette.secondary_text));
                } else if self.pull.progress() > 0.0 {
                    ui.add(egui::ProgressBar::new(self.pull.progress()).desired_width(80.0));
                }
            });
        });
        if ui.input(|i| i.key_pressed(Key::F5)) {
            request.refresh = true;
        }

        if feed.videos.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(50.0);
                if feed.is_loading {
                    ui.add(egui::Spinner::new().size(32.0).color(palette.accent));
                } else {
                    ui.label(RichText::new("No videos found.").size(16.0).color(palette.title));
                }
                ui.add_space(20.0);
                footer_caption(ui, palette);
            });
            return request;
        }

        let width = (ui.available_width() - 32.0).min(self.max_width - 32.0).max(200.0);
        let layout = CardLayout::for_width(width);
        let total_rows = feed.videos.len() + 1;

        let mut pressed: Option<String> = None;
        let output = egui::ScrollArea::vertical()
            .id_source("video_list")
            .auto_shrink([false, false])
            .show_rows(ui, layout.row_height(), total_rows, |ui, rows| {
                for index in rows {
                    match feed.videos.get(index) {
                        Some(video) => {
                            if show_card(ui, video, index, layout, self.playback, palette) {
                                pressed = Some(video.id.clone());
                            }
                        }
                        None => list_footer(ui, feed.is_loading, layout.row_height(), palette),
                    }
                }
            });

        if let Some(id) = pressed {
            (self.on_press)(&id);
        }

        let metrics = ScrollMetrics {
            offset: output.state.offset.y,
            viewport: output.inner_rect.height(),
            content: output.content_size.y,
        };
        let scroll_delta = if ui.rect_contains_pointer(output.inner_rect) {
            ui.input(|i| i.raw_scroll_delta.y)
        } else {
            0.0
        };
        if self.pull.update(metrics.offset <= 0.0, scroll_delta) {
            request.refresh = true;
        }
        if self
            .end_reached
            .check(metrics, feed.has_more && !feed.is_loading)
        {
            request.load_more = true;
        }

        request
    }
}

fn list_footer(ui: &mut egui::Ui, is_loading: bool, height: f32, palette: &Palette) {
    ui.allocate_ui_with_layout(
        egui::vec2(ui.available_width(), height),
        Layout::top_down(Align::Center),
        |ui| {
            ui.add_space(20.0);
            if is_loading {
                ui.add(egui::Spinner::new().size(32.0).color(palette.accent));
                ui.add_space(10.0);
            }
            footer_caption(ui, palette);
        },
    );
}

fn footer_caption(ui: &mut egui::Ui, palette: &Palette) {
    ui.label(RichText::new(FOOTER_CAPTION).strong().size(16.0).color(palette.link));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: f32, content: f32) -> ScrollMetrics {
        ScrollMetrics {
            offset,
            viewport: 600.0,
            content,
        }
    }

    #[test]
    fn end_reached_fires_within_half_a_viewport() {
        let mut end = EndReached::new(0.5);
        assert!(!end.check(at(0.0, 4000.0), true));
        assert!(!end.check(at(3000.0, 4000.0), true), "400 px left is more than 300");
        assert!(end.check(at(3150.0, 4000.0), true));
    }

    #[test]
    fn end_reached_fires_once_until_content_changes() {
        let mut end = EndReached::new(0.5);
        assert!(end.check(at(3400.0, 4000.0), true));
        assert!(!end.check(at(3400.0, 4000.0), true));
        assert!(!end.check(at(3350.0, 4000.0), true));
        assert!(!end.check(at(3400.0, 8000.0), true), "content grew, far from the end again");
        assert!(!end.check(at(7400.0, 8000.0), false), "not allowed to load yet");
        assert!(end.check(at(7400.0, 8000.0), true));
    }

    #[test]
    fn end_reached_rearms_after_scrolling_away() {
        let mut end = EndReached::new(0.5);
        assert!(end.check(at(3400.0, 4000.0), true));
        assert!(!end.check(at(1000.0, 4000.0), true));
        assert!(end.check(at(3400.0, 4000.0), true));
    }

    #[test]
    fn end_reached_waits_while_loading() {
        let mut end = EndReached::new(0.5);
        assert!(!end.check(at(3400.0, 4000.0), false));
        assert!(end.check(at(3400.0, 4000.0), true));
    }

    #[test]
    fn short_list_triggers_immediately() {
        let mut end = EndReached::new(0.5);
        assert!(end.check(at(0.0, 300.0), true));
    }

    #[test]
    fn pull_to_refresh_needs_full_distance_at_top() {
        let mut pull = PullToRefresh::new(80.0);
        assert!(!pull.update(true, 50.0));
        assert!(pull.progress() > 0.5);
        assert!(pull.update(true, 40.0));
        assert_eq!(pull.progress(), 0.0);
    }

    #[test]
    fn pull_to_refresh_resets_when_scrolling_down_or_away_from_top() {
        let mut pull = PullToRefresh::new(80.0);
        assert!(!pull.update(true, 60.0));
        assert!(!pull.update(true, -5.0));
        assert!(!pull.update(true, 60.0));
        assert!(!pull.update(false, 60.0));
        assert_eq!(pull.progress(), 0.0);
    }

    #[test]
    fn refreshing_indicator_requires_existing_content() {
        let mut feed = FeedSnapshot {
            is_loading: true,
            ..FeedSnapshot::default()
        };
        assert!(!feed.is_refreshing());
        feed.videos.push(video_core::VideoRecord {
            id: "a".into(),
            title: "A".into(),
            thumbnail_url: "https://img.example/a.jpg".into(),
            published_at: "2024-01-05T10:00:00Z".into(),
        });
        assert!(feed.is_refreshing());
        feed.is_loading = false;
        assert!(!feed.is_refreshing());
    }
}
