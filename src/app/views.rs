//! Gallery rendering: one section per vehicle with a wrapped grid of tiles
//!
//! Rendering only reads gallery state. Every gesture is collected as a
//! [`GalleryEvent`] and dispatched after the frame is laid out.

use super::App;
use crate::assets;
use crate::gallery::drag::PressTarget;
use crate::gallery::{Gallery, GalleryEvent, NavKey};
use crate::theme;
use crate::types::*;
use crate::ui::components::{paint_selection_overlay, spec_item};
use eframe::egui;
use egui_phosphor::regular as icons;

/// Layout collected while drawing one frame
#[derive(Default)]
struct FrameLayout {
    events: Vec<GalleryEvent>,
    tiles: Vec<(TileId, egui::Rect)>,
    controls: Vec<egui::Rect>,
    formats: Vec<egui::Rect>,
}

/// UV rect that crops a texture to fill `target` without distortion
pub(crate) fn cover_uv(tex_size: egui::Vec2, target: egui::Vec2) -> egui::Rect {
    let full = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }
    let tex_aspect = tex_size.x / tex_size.y;
    let target_aspect = target.x / target.y;
    if tex_aspect > target_aspect {
        let w = target_aspect / tex_aspect;
        egui::Rect::from_min_max(egui::pos2((1.0 - w) / 2.0, 0.0), egui::pos2((1.0 + w) / 2.0, 1.0))
    } else {
        let h = tex_aspect / target_aspect;
        egui::Rect::from_min_max(egui::pos2(0.0, (1.0 - h) / 2.0), egui::pos2(1.0, (1.0 + h) / 2.0))
    }
}

/// Part of a tile the user can see, or `None` when it is scrolled out of view
fn visible_tile(rect: egui::Rect, clip: egui::Rect) -> Option<egui::Rect> {
    let visible = rect.intersect(clip);
    visible.is_positive().then_some(visible)
}

/// Checkbox area in the top-left corner of a tile
fn overlay_rect(tile: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        tile.min + egui::vec2(theme::SPACING_MD, theme::SPACING_MD),
        egui::vec2(theme::CHECKBOX_SIZE, theme::CHECKBOX_SIZE),
    )
}

impl App {
    pub(crate) fn render_gallery(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(gallery) = self.gallery.as_ref() else {
            if self.catalog_failed() {
                // nothing to show; the error is in the log
                return;
            }
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() / 3.0);
                ui.spinner();
            });
            return;
        };

        let mut layout = FrameLayout::default();
        let scroll_locked = gallery.lightbox().scroll_locked();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .id_salt("gallery_scroll")
            .enable_scrolling(!scroll_locked)
            .drag_to_scroll(false)
            .show(ui, |ui| {
                for (v, vehicle) in gallery.vehicles().iter().enumerate() {
                    theme::section_frame().show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        render_header(ui, vehicle);
                        ui.add_space(theme::SPACING_MD);
                        render_controls(ui, gallery, v, &mut layout);
                        ui.add_space(theme::SPACING_MD);
                        render_grid(ui, ctx, gallery, v, &mut self.images, &mut layout);
                    });
                    ui.add_space(theme::SPACING_XL);
                }
            });

        self.tile_rects = layout.tiles;
        self.control_rects.extend(layout.controls);
        self.format_rects = layout.formats;
        for event in layout.events {
            self.dispatch(ctx, event);
        }
    }

    /// Keyboard shortcuts: Escape closes the viewer or clears the selection, arrows navigate
    pub(crate) fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys: Vec<NavKey> = ctx.input(|i| {
            [
                (egui::Key::Escape, NavKey::Escape),
                (egui::Key::ArrowLeft, NavKey::ArrowLeft),
                (egui::Key::ArrowRight, NavKey::ArrowRight),
            ]
            .into_iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, nav)| nav)
            .collect()
        });
        for key in keys {
            self.dispatch(ctx, GalleryEvent::Key(key));
        }
    }

    /// Primary press / move / release become drag-select events. `popup_open` is
    /// sampled before the frame is drawn, since a click outside closes the popup.
    pub(crate) fn handle_pointer(&mut self, ctx: &egui::Context, popup_open: bool) {
        let (pressed, released, dragging, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down() && i.pointer.is_decidedly_dragging() && i.pointer.is_moving(),
                i.pointer.interact_pos(),
            )
        });

        if pressed {
            if let Some(pos) = pos {
                let target = if self.format_rects.iter().any(|r| r.contains(pos)) || popup_open {
                    PressTarget::FormatSelector
                } else if self.control_rects.iter().any(|r| r.contains(pos)) {
                    PressTarget::Button
                } else {
                    PressTarget::Gallery
                };
                let tiles = self.tile_rects.clone();
                self.dispatch(ctx, GalleryEvent::PointerPressed { pos, target, tiles });
            }
        }
        // Moves inside the click threshold stay a click
        if dragging {
            if let Some(pos) = pos {
                self.dispatch(ctx, GalleryEvent::PointerMoved(pos));
            }
        }
        if released {
            self.dispatch(ctx, GalleryEvent::PointerReleased);
        }
    }

    /// Rubber band on top of everything while a drag session runs
    pub(crate) fn render_drag_band(&self, ctx: &egui::Context) {
        let Some(band) = self.gallery.as_ref().and_then(Gallery::drag_band) else {
            return;
        };
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("drag_band"),
        ));
        painter.rect_filled(band, 0.0, theme::DRAG_BAND_FILL);
        painter.rect_stroke(
            band,
            0.0,
            egui::Stroke::new(theme::STROKE_DEFAULT, theme::ACCENT),
            egui::StrokeKind::Inside,
        );
    }
}

fn render_header(ui: &mut egui::Ui, vehicle: &Vehicle) {
    ui.label(
        egui::RichText::new(format!("{} {}", vehicle.brand, vehicle.model))
            .size(theme::FONT_TITLE)
            .strong()
            .color(theme::TEXT_PRIMARY),
    );
    ui.horizontal_wrapped(|ui| {
        spec_item(ui, icons::CALENDAR_BLANK, &vehicle.year);
        if !vehicle.registration.is_empty() {
            spec_item(ui, icons::IDENTIFICATION_CARD, &format!("Reg: {}", vehicle.registration));
        }
        spec_item(ui, icons::GAUGE, &vehicle.mileage);
    });
}

fn render_controls(ui: &mut egui::Ui, gallery: &Gallery, v: usize, layout: &mut FrameLayout) {
    ui.horizontal(|ui| {
        let all = ui.add(theme::button_accent(format!("{}  Download All", icons::DOWNLOAD_SIMPLE)));
        layout.controls.push(all.rect);
        if all.clicked() {
            layout.events.push(GalleryEvent::DownloadAll(v));
        }

        let state = gallery.selection().button(v);
        let button = if state.emphasized {
            theme::button_accent(state.label)
        } else {
            theme::button(state.label)
        };
        let selected = ui.add_enabled(state.enabled, button);
        layout.controls.push(selected.rect);
        if selected.clicked() {
            layout.events.push(GalleryEvent::DownloadSelected(v));
        }

        if gallery.variant().has_format_selector() {
            let mut format = gallery.format();
            let combo = egui::ComboBox::from_id_salt(("download_format", v))
                .selected_text(format.label())
                .show_ui(ui, |ui| {
                    for f in DownloadFormat::ALL {
                        ui.selectable_value(&mut format, f, f.label());
                    }
                });
            layout.formats.push(combo.response.rect);
            if format != gallery.format() {
                layout.events.push(GalleryEvent::FormatChanged(format));
            }
        }
    });
}

fn render_grid(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    gallery: &Gallery,
    v: usize,
    images: &mut super::thumbnails::ImageCache,
    layout: &mut FrameLayout,
) {
    let spacing = theme::SPACING_MD;
    let (base_w, base_h) = theme::TILE_SIZE;
    let available = ui.available_width();
    let num_cols = ((available + spacing) / (base_w + spacing)).floor().max(1.0);
    let tile_w = ((available - spacing * (num_cols - 1.0)) / num_cols).floor();
    let image_h = (base_h * (tile_w / base_w)).floor();

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = egui::vec2(spacing, spacing);
        for (id, vehicle, image) in gallery.vehicle_tiles(v) {
            let is_selected = gallery.selection().is_selected(id.vehicle, id.image);
            let (rect, response) = ui.allocate_exact_size(
                egui::vec2(tile_w, image_h + theme::CAPTION_HEIGHT),
                egui::Sense::click(),
            );
            // Drag-select only sees what is on screen
            if let Some(visible) = visible_tile(rect, ui.clip_rect()) {
                layout.tiles.push((id, visible));
            }
            let overlay = overlay_rect(rect);

            if ui.is_rect_visible(rect) {
                let painter = ui.painter();
                let image_rect = egui::Rect::from_min_size(rect.min, egui::vec2(tile_w, image_h));
                painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_ELEVATED);

                let thumb = assets::thumbnail_path(gallery.variant(), vehicle, image);
                let fallback = assets::original_path(vehicle, image);
                if let Some(tex) = images.thumbnail(ctx, &thumb, &fallback) {
                    let uv = cover_uv(tex.size_vec2(), image_rect.size());
                    painter.image(tex.id(), image_rect, uv, egui::Color32::WHITE);
                } else {
                    painter.text(
                        image_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        icons::IMAGE,
                        egui::FontId::proportional(28.0),
                        theme::TEXT_DIM,
                    );
                }

                if is_selected {
                    painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::TILE_SELECTED_TINT);
                } else if response.hovered() {
                    painter.rect_filled(image_rect, theme::RADIUS_DEFAULT, theme::TILE_HOVER_TINT);
                }

                let (width, color) = if is_selected {
                    (theme::STROKE_THICK, theme::ACCENT)
                } else {
                    (theme::STROKE_DEFAULT, theme::BORDER_DEFAULT)
                };
                painter.rect_stroke(
                    rect,
                    theme::RADIUS_DEFAULT,
                    egui::Stroke::new(width, color),
                    egui::StrokeKind::Outside,
                );

                let overlay_hovered = response
                    .hover_pos()
                    .is_some_and(|p| overlay.contains(p));
                paint_selection_overlay(painter, overlay, is_selected, overlay_hovered);

                painter.text(
                    egui::pos2(rect.min.x + theme::SPACING_MD, rect.max.y - theme::CAPTION_HEIGHT / 2.0),
                    egui::Align2::LEFT_CENTER,
                    &image.caption,
                    egui::FontId::proportional(theme::FONT_SMALL),
                    theme::TEXT_MUTED,
                );

                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
            }

            if response.clicked_by(egui::PointerButton::Primary) {
                let on_overlay = response
                    .interact_pointer_pos()
                    .is_some_and(|p| overlay.contains(p));
                layout.events.push(GalleryEvent::TileClicked { tile: id, on_overlay });
            }
        }
    });
}
