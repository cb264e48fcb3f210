//! Reusable UI components

use crate::theme;
use eframe::egui;

/// Paint the selection checkbox in a tile corner. Purely visual: the tile owns
/// the click and decides by position whether it landed on the checkbox.
pub fn paint_selection_overlay(painter: &egui::Painter, rect: egui::Rect, selected: bool, hovered: bool) {
    if selected {
        painter.rect_filled(rect, 3.0, theme::ACCENT);
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::CHECK,
            egui::FontId::proportional(rect.height() * 0.7),
            egui::Color32::WHITE,
        );
    } else {
        let fill = if hovered {
            egui::Color32::from_black_alpha(160)
        } else {
            egui::Color32::from_black_alpha(90)
        };
        painter.rect_filled(rect, 3.0, fill);
        painter.rect_stroke(
            rect,
            3.0,
            egui::Stroke::new(1.5, theme::TEXT_SECONDARY),
            egui::StrokeKind::Inside,
        );
    }
}

/// Icon + text pair used in vehicle headers
pub fn spec_item(ui: &mut egui::Ui, icon: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    ui.label(
        egui::RichText::new(format!("{}  {}", icon, text))
            .size(theme::FONT_BODY)
            .color(theme::TEXT_MUTED),
    );
}

/// Round icon button painted over the lightbox image
pub fn overlay_icon_button(ui: &mut egui::Ui, center: egui::Pos2, icon: &str, id: &str) -> egui::Response {
    let rect = egui::Rect::from_center_size(
        center,
        egui::vec2(theme::NAV_BUTTON_SIZE, theme::NAV_BUTTON_SIZE),
    );
    let response = ui.interact(rect, ui.id().with(id), egui::Sense::click());
    let (fill, draw_rect) =
        theme::button_visual(&response, egui::Color32::from_black_alpha(140), rect);
    ui.painter()
        .circle_filled(draw_rect.center(), draw_rect.width() / 2.0, fill);
    ui.painter().text(
        draw_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(theme::NAV_BUTTON_SIZE * 0.5),
        theme::TEXT_PRIMARY,
    );
    response
}
