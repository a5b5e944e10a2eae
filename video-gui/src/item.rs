use eframe::egui::{self, Align, Align2, Color32, FontId, Layout, Pos2, Rect, RichText, Sense, Shape, Stroke};
use tracing::warn;
use video_core::text::{accessibility_label, decode_entities, format_published_date};
use video_core::{PlaybackMode, VideoRecord};

use crate::theme::Palette;

const INFO_HEIGHT: f32 = 96.0;
const CARD_GAP: f32 = 20.0;
const CARD_ROUNDING: f32 = 12.0;

/// Dimensions d'une carte pour une largeur de liste donnée (miniature 16:9 + bloc titre)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardLayout {
    pub width: f32,
    pub thumbnail_height: f32,
}

impl CardLayout {
    pub fn for_width(width: f32) -> Self {
        Self {
            width,
            thumbnail_height: width * 9.0 / 16.0,
        }
    }

    pub fn card_height(&self) -> f32 {
        self.thumbnail_height + INFO_HEIGHT
    }

    /// Hauteur d'une ligne de la liste virtualisée, marge comprise
    pub fn row_height(&self) -> f32 {
        self.card_height() + CARD_GAP
    }
}

/// Draws one video card. Returns `true` when the press must be handed to the host.
pub fn show_card(
    ui: &mut egui::Ui,
    video: &VideoRecord,
    index: usize,
    layout: CardLayout,
    playback: PlaybackMode,
    palette: &Palette,
) -> bool {
    let (row, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), layout.row_height()),
        Sense::hover(),
    );
    let card_rect = Rect::from_min_size(
        Pos2::new(row.center().x - layout.width / 2.0, row.top()),
        egui::vec2(layout.width, layout.card_height()),
    );
    let thumb_rect = Rect::from_min_size(
        card_rect.min,
        egui::vec2(layout.width, layout.thumbnail_height),
    );
    let info_rect = Rect::from_min_max(
        Pos2::new(card_rect.left(), thumb_rect.bottom()),
        card_rect.max,
    );

    let title = decode_entities(&video.title);
    let date = format_published_date(&video.published_at).unwrap_or_else(|| video.published_at.clone());
    let playing_id = egui::Id::new(("video_playing", &video.id));
    let is_playing = playback == PlaybackMode::Inline
        && ui.data(|d| d.get_temp::<bool>(playing_id)).unwrap_or(false);

    // Zone cliquable enregistrée avant les boutons internes pour qu'ils restent prioritaires
    let sense = if is_playing { Sense::hover() } else { Sense::click() };
    let response = ui.interact(card_rect, egui::Id::new(("video_card", &video.id)), sense);
    let hovered = response.hovered() && !is_playing;

    let painter = ui.painter_at(card_rect.expand(2.0));
    let border = if hovered { palette.accent } else { palette.card_border() };
    painter.rect(card_rect, CARD_ROUNDING, palette.card, Stroke::new(1.0, border));

    if is_playing {
        paint_player(ui, video, thumb_rect, &title, playing_id);
    } else {
        paint_thumbnail(ui, video, thumb_rect, hovered, palette);
    }

    let mut info = ui.child_ui(info_rect.shrink(16.0), Layout::top_down(Align::LEFT));
    info.set_clip_rect(info_rect.intersect(ui.clip_rect()));
    info.add(
        egui::Label::new(RichText::new(&title).strong().size(18.0).color(palette.title)).truncate(true),
    );
    info.add_space(6.0);
    info.horizontal(|ui| {
        ui.label(RichText::new(&date).size(13.0).color(palette.secondary_text));
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            egui::Frame::none()
                .fill(palette.accent)
                .rounding(4.0)
                .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                .show(ui, |ui| {
                    ui.label(RichText::new("MÈME").strong().size(10.0).color(Color32::WHITE));
                });
        });
    });

    let label = accessibility_label(index, &title, &date);
    let clicked = response.on_hover_text(label).clicked();
    if !clicked {
        return false;
    }

    match playback {
        PlaybackMode::External => true,
        PlaybackMode::Inline => {
            ui.data_mut(|d| d.insert_temp(playing_id, true));
            open_player(video);
            false
        }
    }
}

fn paint_thumbnail(ui: &mut egui::Ui, video: &VideoRecord, rect: Rect, hovered: bool, palette: &Palette) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(
        rect,
        egui::Rounding { nw: CARD_ROUNDING, ne: CARD_ROUNDING, sw: 0.0, se: 0.0 },
        Color32::from_rgb(240, 242, 245),
    );
    egui::Image::new(video.thumbnail_url.as_str())
        .rounding(egui::Rounding { nw: CARD_ROUNDING, ne: CARD_ROUNDING, sw: 0.0, se: 0.0 })
        .show_loading_spinner(true)
        .paint_at(ui, rect);

    let overlay = if hovered {
        Color32::from_rgba_unmultiplied(225, 27, 34, 51)
    } else {
        Color32::from_rgba_unmultiplied(0, 0, 0, 38)
    };
    painter.rect_filled(rect, 0.0, overlay);

    // Bouton lecture: disque blanc + triangle
    let center = rect.center();
    painter.circle_filled(center, 32.0, Color32::from_rgba_unmultiplied(255, 255, 255, 242));
    let tip = center + egui::vec2(14.0, 0.0);
    painter.add(Shape::convex_polygon(
        vec![
            center + egui::vec2(-8.0, -12.0),
            tip,
            center + egui::vec2(-8.0, 12.0),
        ],
        palette.accent,
        Stroke::NONE,
    ));
}

fn paint_player(ui: &mut egui::Ui, video: &VideoRecord, rect: Rect, title: &str, playing_id: egui::Id) {
    ui.painter_at(rect).rect_filled(
        rect,
        egui::Rounding { nw: CARD_ROUNDING, ne: CARD_ROUNDING, sw: 0.0, se: 0.0 },
        Color32::BLACK,
    );
    ui.painter_at(rect).text(
        rect.center() - egui::vec2(0.0, 24.0),
        Align2::CENTER_CENTER,
        format!("▶ {title}"),
        FontId::proportional(16.0),
        Color32::WHITE,
    );

    let buttons = Rect::from_center_size(rect.center() + egui::vec2(0.0, 16.0), egui::vec2(rect.width(), 32.0));
    let mut child = ui.child_ui(buttons, Layout::left_to_right(Align::Center).with_main_align(Align::Center));
    if child.button("Ouvrir le lecteur").clicked() {
        open_player(video);
    }
    if child.button("Fermer").clicked() {
        ui.data_mut(|d| d.insert_temp(playing_id, false));
    }
}

fn open_player(video: &VideoRecord) {
    if let Err(err) = webbrowser::open(&video.embed_url()) {
        warn!(error = %err, video = %video.id, "failed to open embedded player");
    }
}
