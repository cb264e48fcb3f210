//! Settings side panel: asset source, gallery variant and download folder

use super::thumbnails::ImageCache;
use super::App;
use crate::assets::AssetSource;
use crate::theme;
use crate::types::GalleryVariant;
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::info;

impl App {
    pub(crate) fn render_settings_panel(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut apply = false;
        let panel = egui::SidePanel::right("settings_panel")
            .exact_width(theme::SETTINGS_PANEL_WIDTH)
            .resizable(false)
            .frame(theme::sidebar_frame())
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(format!("{}  Settings", icons::GEAR))
                        .size(theme::FONT_TITLE)
                        .color(theme::TEXT_PRIMARY),
                );
                ui.add_space(theme::SPACING_XL);

                ui.label(egui::RichText::new("Gallery source").color(theme::TEXT_MUTED));
                ui.add(
                    egui::TextEdit::singleline(&mut self.source_input)
                        .hint_text("https://example.com/gallery or a folder")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(theme::SPACING_LG);

                ui.label(egui::RichText::new("Gallery variant").color(theme::TEXT_MUTED));
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.variant_input, GalleryVariant::Basic, "Basic");
                    ui.selectable_value(&mut self.variant_input, GalleryVariant::Enhanced, "Enhanced");
                });
                ui.add_space(theme::SPACING_LG);

                ui.label(egui::RichText::new("Download folder").color(theme::TEXT_MUTED));
                ui.label(
                    egui::RichText::new(self.download_path.display().to_string())
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_SECONDARY),
                );
                if ui
                    .add(theme::button(format!("{}  Browse", icons::FOLDER)))
                    .clicked()
                {
                    if let Some(dir) = rfd::FileDialog::new()
                        .set_directory(&self.download_path)
                        .pick_folder()
                    {
                        info!(path = %dir.display(), "Download folder changed");
                        self.download_path = dir;
                    }
                }

                ui.add_space(theme::SPACING_XL);
                if ui
                    .add(theme::button_accent(format!("{}  Apply & reload", icons::ARROW_CLOCKWISE)))
                    .clicked()
                {
                    apply = true;
                }
            });
        self.control_rects.push(panel.response.rect);

        if apply {
            self.apply_settings(ctx);
        }
    }

    /// Rebuild the asset source and gallery from the panel inputs
    fn apply_settings(&mut self, ctx: &egui::Context) {
        let source = self.source_input.trim().to_string();
        info!(source = %source, variant = ?self.variant_input, "Reloading gallery");

        self.settings.source = source;
        self.settings.variant = self.variant_input;
        self.source = AssetSource::from_location(&self.settings.source);
        self.images = ImageCache::new(self.source.clone(), self.runtime.handle().clone());
        self.tile_rects.clear();
        self.save_settings();
        self.start_catalog_load(ctx);
    }
}
