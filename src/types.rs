//! Common types and data structures

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// One listing in the catalog. Identified by its position in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Vehicle {
    pub brand: String,
    pub model: String,
    #[serde(default, deserialize_with = "display_value")]
    pub year: String,
    #[serde(default, deserialize_with = "display_value")]
    pub registration: String,
    #[serde(default, deserialize_with = "display_value")]
    pub mileage: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// One photo of a vehicle. Identified by its position in the vehicle's image list.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub filename: String,
    #[serde(default)]
    pub caption: String,
}

/// Accepts strings, numbers, booleans or null and keeps them as display text.
fn display_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// (vehicle index, image index) identity of a tile in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub vehicle: usize,
    pub image: usize,
}

impl TileId {
    pub fn new(vehicle: usize, image: usize) -> Self {
        Self { vehicle, image }
    }
}

/// Which asset set the gallery shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryVariant {
    /// Raw filenames everywhere, no format selector
    Basic,
    /// WebP thumbnails and full-size views, per-vehicle format selector
    #[default]
    Enhanced,
}

impl GalleryVariant {
    pub fn has_format_selector(self) -> bool {
        matches!(self, Self::Enhanced)
    }
}

/// Asset variant packed into archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    /// Full-resolution re-encode, original container
    #[default]
    Optimized,
    /// Full-resolution WebP
    Webp,
    /// Untouched upload
    Original,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 3] = [Self::Optimized, Self::Webp, Self::Original];

    /// Suffix used in archive names
    pub fn slug(self) -> &'static str {
        match self {
            Self::Optimized => "optimized",
            Self::Webp => "webp",
            Self::Original => "original",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Optimized => "Optimized JPG",
            Self::Webp => "WebP (smallest)",
            Self::Original => "Original",
        }
    }
}

/// Which button started an archive download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    All,
    Selected,
}

impl ArchiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Selected => "Selected",
        }
    }
}

/// Status of one archive job
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    Fetching { done: usize, total: usize },
    Packing,
    Saved(PathBuf),
    Failed,
}

/// Progress of one archive job, shared with its download task
#[derive(Debug, Default)]
pub struct DownloadState {
    pub archive_name: String,
    pub status: Option<DownloadStatus>,
    pub fetched: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

impl DownloadState {
    pub fn is_running(&self) -> bool {
        matches!(
            self.status,
            Some(DownloadStatus::Fetching { .. }) | Some(DownloadStatus::Packing)
        )
    }
}
