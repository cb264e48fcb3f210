//! App module - contains the main application state and logic

mod downloads;
mod lightbox;
mod settings_panel;
mod thumbnails;
mod views;

use crate::assets::AssetSource;
use crate::catalog::load_catalog;
use crate::gallery::{Gallery, GalleryEvent};
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thumbnails::ImageCache;
use tracing::{debug, error};

/// Progress of the one-time catalog read
pub(crate) enum CatalogLoad {
    Loading,
    Loaded(Vec<Vehicle>),
    Failed,
}

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) source: AssetSource,
    pub(crate) catalog_load: Arc<Mutex<CatalogLoad>>,
    /// `None` until the catalog arrives, and forever if it fails
    pub(crate) gallery: Option<Gallery>,
    pub(crate) images: ImageCache,
    // Download state
    pub(crate) download_jobs: Vec<Arc<Mutex<DownloadState>>>,
    pub(crate) download_path: PathBuf,
    // Settings panel
    pub(crate) show_settings: bool,
    pub(crate) source_input: String,
    pub(crate) variant_input: GalleryVariant,
    // Layout of the last rendered frame, used for drag-select and press routing
    pub(crate) tile_rects: Vec<(TileId, egui::Rect)>,
    pub(crate) control_rects: Vec<egui::Rect>,
    pub(crate) format_rects: Vec<egui::Rect>,
    // Window geometry, saved on exit
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let source = AssetSource::from_location(&settings.source);
        let images = ImageCache::new(source.clone(), runtime.handle().clone());
        let download_path = settings.download_path_or_default();

        let mut app = Self {
            source_input: settings.source.clone(),
            variant_input: settings.variant,
            settings,
            data_dir,
            runtime,
            source,
            catalog_load: Arc::new(Mutex::new(CatalogLoad::Loading)),
            gallery: None,
            images,
            download_jobs: Vec::new(),
            download_path,
            show_settings: false,
            tile_rects: Vec::new(),
            control_rects: Vec::new(),
            format_rects: Vec::new(),
            window_pos: None,
            window_size: None,
            needs_center: false,
        };
        app.start_catalog_load(&cc.egui_ctx);
        app
    }

    /// Read the catalog in the background. Failure is logged and leaves the gallery empty.
    pub(crate) fn start_catalog_load(&mut self, ctx: &egui::Context) {
        // A fresh slot so an earlier, slower load cannot land on top of this one
        self.catalog_load = Arc::new(Mutex::new(CatalogLoad::Loading));
        self.gallery = None;

        let source = self.source.clone();
        let slot = self.catalog_load.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = match load_catalog(&source).await {
                Ok(vehicles) => CatalogLoad::Loaded(vehicles),
                Err(e) => {
                    error!(error = %e, "Error loading gallery data");
                    CatalogLoad::Failed
                }
            };
            *slot.lock().unwrap() = result;
            ctx.request_repaint();
        });
    }

    /// Build the gallery once the catalog has arrived
    pub(crate) fn poll_catalog(&mut self) {
        let vehicles = {
            let mut slot = self.catalog_load.lock().unwrap();
            match std::mem::replace(&mut *slot, CatalogLoad::Loading) {
                CatalogLoad::Loaded(vehicles) => vehicles,
                other => {
                    *slot = other;
                    return;
                }
            }
        };
        let gallery = Gallery::new(vehicles, self.settings.variant, self.settings.download_format);
        debug!(
            vehicles = gallery.vehicles().len(),
            images = gallery.tiles().count(),
            "Gallery built"
        );
        self.gallery = Some(gallery);
    }

    pub(crate) fn catalog_failed(&self) -> bool {
        matches!(*self.catalog_load.lock().unwrap(), CatalogLoad::Failed)
    }

    /// Hand one UI event to the gallery and run whatever it asks for
    pub(crate) fn dispatch(&mut self, ctx: &egui::Context, event: GalleryEvent) {
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        if let GalleryEvent::FormatChanged(format) = &event {
            self.settings.download_format = *format;
        }
        if let Some(request) = gallery.handle(event) {
            self.start_download(ctx, request);
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.download_path = Some(self.download_path.to_string_lossy().to_string());
        self.settings.save(&self.data_dir);
    }
}
