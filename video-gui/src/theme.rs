use eframe::egui::{self, Color32, Rounding, Stroke};
use video_core::ThemeConfig;

/// Couleurs résolues à partir de la configuration
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color32,
    pub header: Color32,
    pub accent: Color32,
    pub link: Color32,
    pub title: Color32,
    pub secondary_text: Color32,
    pub card: Color32,
}

fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

impl From<&ThemeConfig> for Palette {
    fn from(theme: &ThemeConfig) -> Self {
        Self {
            background: rgb(theme.background_color),
            header: rgb(theme.header_color),
            accent: rgb(theme.accent_color),
            link: rgb(theme.link_color),
            title: rgb(theme.title_color),
            secondary_text: rgb(theme.secondary_text_color),
            card: rgb(theme.card_color),
        }
    }
}

impl Palette {
    pub fn card_border(&self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.header.r(), self.header.g(), self.header.b(), 20)
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.dark_mode = false;
        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.background;
        style.visuals.extreme_bg_color = Color32::from_rgb(240, 242, 245);
        style.visuals.hyperlink_color = self.accent;

        style.visuals.widgets.inactive.bg_fill = self.card;
        style.visuals.widgets.inactive.weak_bg_fill = self.card;
        style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.card_border());
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.title);

        style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.title);

        style.visuals.widgets.active.bg_fill = self.accent;
        style.visuals.widgets.active.weak_bg_fill = self.accent;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

        style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(225, 27, 34, 60);
        style.visuals.selection.stroke = Stroke::new(1.0, self.accent);

        style.visuals.widgets.noninteractive.rounding = Rounding::same(4.0);
        style.visuals.widgets.inactive.rounding = Rounding::same(4.0);
        style.visuals.widgets.hovered.rounding = Rounding::same(4.0);
        style.visuals.widgets.active.rounding = Rounding::same(4.0);

        style.spacing.item_spacing = egui::vec2(10.0, 8.0);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);

        ctx.set_style(style);
    }
}
