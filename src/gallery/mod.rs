//! Gallery state and event dispatch
//!
//! The UI never mutates selection or viewer state directly. Each gesture is
//! turned into a [`GalleryEvent`] and handed to [`Gallery::handle`], which routes
//! it to exactly one of the selection, drag-select or lightbox handlers. This
//! keeps the interaction rules testable without a window.

pub mod drag;
pub mod lightbox;
pub mod selection;

use crate::assets::{self, archive_name, download_entry};
use crate::types::*;
use drag::{DragSelect, PressTarget};
use egui::{Pos2, Rect};
use lightbox::Lightbox;
use selection::Selection;
use tracing::debug;

/// Keys the gallery reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone)]
pub enum GalleryEvent {
    /// Primary click on a tile; `on_overlay` when it landed on the selection checkbox
    TileClicked { tile: TileId, on_overlay: bool },
    /// Primary press anywhere, with the tile layout at that moment
    PointerPressed {
        pos: Pos2,
        target: PressTarget,
        tiles: Vec<(TileId, Rect)>,
    },
    PointerMoved(Pos2),
    PointerReleased,
    Key(NavKey),
    LightboxNext,
    LightboxPrev,
    LightboxClose,
    /// Click on the dimmed area around the image, not on the image or its controls
    BackdropClicked,
    DownloadAll(usize),
    DownloadSelected(usize),
    FormatChanged(DownloadFormat),
}

/// One archive member to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub source_path: String,
    pub member_name: String,
}

/// Fully resolved archive job. Paths are fixed at creation, so later format
/// changes do not affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub archive_name: String,
    pub entries: Vec<DownloadEntry>,
}

pub struct Gallery {
    vehicles: Vec<Vehicle>,
    variant: GalleryVariant,
    format: DownloadFormat,
    selection: Selection,
    drag: DragSelect,
    lightbox: Lightbox,
}

impl Gallery {
    pub fn new(vehicles: Vec<Vehicle>, variant: GalleryVariant, format: DownloadFormat) -> Self {
        let selection = Selection::new(vehicles.len());
        Self {
            vehicles,
            variant,
            format,
            selection,
            drag: DragSelect::default(),
            lightbox: Lightbox::default(),
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn variant(&self) -> GalleryVariant {
        self.variant
    }

    pub fn format(&self) -> DownloadFormat {
        self.format
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn drag_band(&self) -> Option<Rect> {
        self.drag.band()
    }

    /// Every tile in catalog order: vehicle order, then image order
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &Vehicle, &Image)> + '_ {
        (0..self.vehicles.len()).flat_map(move |v| self.vehicle_tiles(v))
    }

    /// Tiles of one vehicle section, in image order
    pub fn vehicle_tiles(&self, v: usize) -> impl Iterator<Item = (TileId, &Vehicle, &Image)> + '_ {
        self.vehicles.get(v).into_iter().flat_map(move |vehicle| {
            vehicle
                .images
                .iter()
                .enumerate()
                .map(move |(i, image)| (TileId::new(v, i), vehicle, image))
        })
    }

    pub fn handle(&mut self, event: GalleryEvent) -> Option<DownloadRequest> {
        match event {
            GalleryEvent::TileClicked { tile, on_overlay } => {
                self.click_tile(tile, on_overlay);
                None
            }
            GalleryEvent::PointerPressed { pos, target, tiles } => {
                // the viewer swallows every press while it is up
                let target = if self.lightbox.is_open() { PressTarget::Lightbox } else { target };
                self.drag.begin(pos, target, tiles);
                None
            }
            GalleryEvent::PointerMoved(pos) => {
                let added = self.drag.update(pos, &mut self.selection);
                if !added.is_empty() {
                    debug!(added = added.len(), total = self.selection.total(), "Drag selected tiles");
                }
                None
            }
            GalleryEvent::PointerReleased => {
                if self.drag.is_active() {
                    debug!(total = self.selection.total(), "Drag session ended");
                    self.drag.end();
                }
                None
            }
            GalleryEvent::Key(key) => {
                self.key(key);
                None
            }
            GalleryEvent::LightboxNext => {
                self.lightbox.next();
                None
            }
            GalleryEvent::LightboxPrev => {
                self.lightbox.prev();
                None
            }
            GalleryEvent::LightboxClose | GalleryEvent::BackdropClicked => {
                self.lightbox.close();
                None
            }
            GalleryEvent::DownloadAll(v) => {
                let count = self.vehicles.get(v)?.images.len();
                self.download_request(v, (0..count).collect(), ArchiveKind::All)
            }
            GalleryEvent::DownloadSelected(v) => {
                let indices = self.selection.indices(v);
                self.download_request(v, indices, ArchiveKind::Selected)
            }
            GalleryEvent::FormatChanged(format) => {
                self.format = format;
                None
            }
        }
    }

    /// Selection mode or an overlay click toggles; a plain click in browse mode opens the viewer.
    /// Selection mode is global, so one selected image anywhere turns every plain click into a toggle.
    fn click_tile(&mut self, tile: TileId, on_overlay: bool) {
        if self.selection.is_active() || on_overlay {
            self.selection.toggle(tile.vehicle, tile.image);
        } else if let Some(vehicle) = self.vehicles.get(tile.vehicle) {
            let images = vehicle
                .images
                .iter()
                .map(|image| assets::lightbox_path(self.variant, vehicle, image))
                .collect();
            self.lightbox.open(images, tile.image);
        }
    }

    fn key(&mut self, key: NavKey) {
        match (key, self.lightbox.is_open()) {
            (NavKey::Escape, true) => self.lightbox.close(),
            (NavKey::Escape, false) => self.selection.clear_all(),
            (NavKey::ArrowRight, true) => self.lightbox.next(),
            (NavKey::ArrowLeft, true) => self.lightbox.prev(),
            _ => {}
        }
    }

    /// Format carried into archive names; `None` in the basic variant
    fn archive_format(&self) -> Option<DownloadFormat> {
        self.variant.has_format_selector().then_some(self.format)
    }

    fn download_request(
        &self,
        vehicle_index: usize,
        indices: Vec<usize>,
        kind: ArchiveKind,
    ) -> Option<DownloadRequest> {
        let vehicle = self.vehicles.get(vehicle_index)?;
        let format = self.archive_format();
        let entries: Vec<DownloadEntry> = indices
            .iter()
            .filter_map(|&i| vehicle.images.get(i))
            .map(|image| {
                let (source_path, member_name) =
                    download_entry(format.unwrap_or(DownloadFormat::Original), vehicle, image);
                DownloadEntry { source_path, member_name }
            })
            .collect();
        if entries.is_empty() {
            return None;
        }
        Some(DownloadRequest {
            archive_name: archive_name(vehicle, kind, format),
            entries,
        })
    }
}
