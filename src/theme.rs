//! Light theme for the particle viewers

use egui::Color32;

/// Light palette: white canvas, grey chrome, blue markers
pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(255, 255, 255);     // #FFFFFF - canvas
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(244, 244, 244);    // #F4F4F4 - overlays
    pub const BG_HOVER: Color32 = Color32::from_rgb(228, 228, 228);       // #E4E4E4 - hover states

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(20, 20, 20);      // #141414
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(90, 90, 90);    // #5A5A5A
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(150, 150, 150);     // #969696

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(210, 210, 210);         // #D2D2D2

    // === Scene ===
    /// Domain cube edges: (0.3, 0.3, 0.3) at 80% opacity
    pub const CUBE_EDGE: Color32 = Color32::from_rgba_premultiplied(61, 61, 61, 204);
    /// Marker fill: (0.2, 0.2, 0.8)
    pub const MARKER_FILL: Color32 = Color32::from_rgb(51, 51, 204);

    // === Status ===
    pub const STATUS_OK: Color32 = Color32::from_rgb(60, 160, 60);
    pub const STATUS_PENDING: Color32 = Color32::from_rgb(190, 150, 30);
    pub const STATUS_BAD: Color32 = Color32::from_rgb(200, 70, 70);
}

/// Create light egui Visuals
pub fn light_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::light();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_PRIMARY;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;

    // No shadows - flat design
    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}

/// Status color for a subscriber state
pub fn status_color(state: &crate::sub_state::SubState) -> Color32 {
    use crate::sub_state::SubState;
    match state {
        SubState::Connected => colors::STATUS_OK,
        SubState::Connecting => colors::STATUS_PENDING,
        SubState::Disconnected | SubState::Interrupted | SubState::Error(_) => colors::STATUS_BAD,
    }
}
