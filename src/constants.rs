//! Application constants and configuration

pub const APP_NAME: &str = "Vehicle Gallery";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog document, relative to the asset source root
pub const CATALOG_PATH: &str = "data.json";

/// Brand whose assets live in their own folder; everything else shares `FALLBACK_FOLDER`
pub const CHERY_BRAND: &str = "Chery";
pub const FALLBACK_FOLDER: &str = "DFSK";

pub const THUMBNAILS_DIR: &str = "thumbnails";
pub const FULL_DIR: &str = "full";

/// Extension used for generated thumbnails and compressed full-size variants
pub const EFFICIENT_EXT: &str = "webp";
