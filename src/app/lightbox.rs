//! Full-screen image viewer

use super::thumbnails::{ImageKind, ImageSlot};
use super::App;
use crate::gallery::GalleryEvent;
use crate::theme;
use crate::ui::components::overlay_icon_button;
use eframe::egui;
use egui_phosphor::regular as icons;

/// Image rect fitted inside `bounds`, never upscaled
fn fit_rect(tex_size: egui::Vec2, bounds: egui::Rect) -> egui::Rect {
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 {
        return egui::Rect::from_center_size(bounds.center(), egui::Vec2::ZERO);
    }
    let scale = (bounds.width() / tex_size.x)
        .min(bounds.height() / tex_size.y)
        .min(1.0);
    egui::Rect::from_center_size(bounds.center(), tex_size * scale)
}

impl App {
    pub(crate) fn render_lightbox(&mut self, ctx: &egui::Context) {
        let Some(gallery) = self.gallery.as_ref() else {
            return;
        };
        let (Some(path), Some((position, count))) =
            (gallery.lightbox().current().map(str::to_owned), gallery.lightbox().counter())
        else {
            return;
        };

        let screen = ctx.screen_rect();
        let mut event = None;

        egui::Area::new(egui::Id::new("lightbox"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let backdrop = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, theme::BG_BACKDROP);

                let margin = theme::NAV_BUTTON_SIZE + theme::SPACING_XL * 2.0;
                let bounds = screen.shrink2(egui::vec2(margin, margin));
                let mut image_rect = egui::Rect::NOTHING;

                match self.images.get(ctx, &path, ImageKind::Full) {
                    ImageSlot::Ready(tex) => {
                        image_rect = fit_rect(tex.size_vec2(), bounds);
                        ui.painter().image(
                            tex.id(),
                            image_rect,
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    ImageSlot::Loading => {
                        ui.put(
                            egui::Rect::from_center_size(bounds.center(), egui::vec2(48.0, 48.0)),
                            egui::Spinner::new().size(32.0),
                        );
                    }
                    ImageSlot::Failed => {
                        ui.painter().text(
                            bounds.center(),
                            egui::Align2::CENTER_CENTER,
                            format!("{}  Image not available", icons::IMAGE_BROKEN),
                            egui::FontId::proportional(theme::FONT_TITLE),
                            theme::TEXT_MUTED,
                        );
                    }
                }

                ui.painter().text(
                    egui::pos2(screen.center().x, screen.max.y - theme::SPACING_XL),
                    egui::Align2::CENTER_BOTTOM,
                    format!("{} / {}", position, count),
                    egui::FontId::proportional(theme::FONT_BODY),
                    theme::TEXT_SECONDARY,
                );

                let half = theme::NAV_BUTTON_SIZE / 2.0 + theme::SPACING_XL;
                let close = overlay_icon_button(
                    ui,
                    egui::pos2(screen.max.x - half, screen.min.y + half),
                    icons::X,
                    "lightbox_close",
                );
                let prev = overlay_icon_button(
                    ui,
                    egui::pos2(screen.min.x + half, screen.center().y),
                    icons::CARET_LEFT,
                    "lightbox_prev",
                );
                let next = overlay_icon_button(
                    ui,
                    egui::pos2(screen.max.x - half, screen.center().y),
                    icons::CARET_RIGHT,
                    "lightbox_next",
                );

                // Buttons win over the backdrop underneath them
                if close.clicked() {
                    event = Some(GalleryEvent::LightboxClose);
                } else if prev.clicked() {
                    event = Some(GalleryEvent::LightboxPrev);
                } else if next.clicked() {
                    event = Some(GalleryEvent::LightboxNext);
                } else if backdrop.clicked() {
                    let on_image = backdrop
                        .interact_pointer_pos()
                        .is_some_and(|p| image_rect.contains(p));
                    if !on_image {
                        event = Some(GalleryEvent::BackdropClicked);
                    }
                }
            });

        if let Some(event) = event {
            self.dispatch(ctx, event);
        }
    }
}
