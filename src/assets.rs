//! Asset locations and fetching
//!
//! Physical asset paths are never stored in the catalog; they are derived from
//! the vehicle's brand folder, the image filename and the viewing context.

use crate::constants::*;
use crate::error::FetchError;
use crate::types::{ArchiveKind, DownloadFormat, GalleryVariant, Image, Vehicle};
use crate::utils::sanitize_file_name;
use std::path::PathBuf;
use tracing::debug;

/// Folder holding a brand's assets. Binary rule: Chery has its own folder, every
/// other brand lives under the fallback folder.
pub fn asset_folder(brand: &str) -> &'static str {
    if brand == CHERY_BRAND {
        CHERY_BRAND
    } else {
        FALLBACK_FOLDER
    }
}

/// Filename without its last extension
pub fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

fn efficient_name(filename: &str) -> String {
    format!("{}.{}", file_stem(filename), EFFICIENT_EXT)
}

/// Untouched upload, also the fallback when a thumbnail cannot be shown
pub fn original_path(vehicle: &Vehicle, image: &Image) -> String {
    format!("{}/{}", asset_folder(&vehicle.brand), image.filename)
}

/// Path of the image shown in a grid tile
pub fn thumbnail_path(variant: GalleryVariant, vehicle: &Vehicle, image: &Image) -> String {
    match variant {
        GalleryVariant::Basic => original_path(vehicle, image),
        GalleryVariant::Enhanced => format!(
            "{}/{}/{}",
            asset_folder(&vehicle.brand),
            THUMBNAILS_DIR,
            efficient_name(&image.filename)
        ),
    }
}

/// Path of the full-size image shown in the lightbox
pub fn lightbox_path(variant: GalleryVariant, vehicle: &Vehicle, image: &Image) -> String {
    match variant {
        GalleryVariant::Basic => original_path(vehicle, image),
        GalleryVariant::Enhanced => format!(
            "{}/{}/{}",
            asset_folder(&vehicle.brand),
            FULL_DIR,
            efficient_name(&image.filename)
        ),
    }
}

/// Source path and archive member name for a download in the given format
pub fn download_entry(format: DownloadFormat, vehicle: &Vehicle, image: &Image) -> (String, String) {
    let folder = asset_folder(&vehicle.brand);
    match format {
        DownloadFormat::Original => (original_path(vehicle, image), image.filename.clone()),
        DownloadFormat::Webp => {
            let name = efficient_name(&image.filename);
            (format!("{}/{}/{}", folder, FULL_DIR, name), name)
        }
        DownloadFormat::Optimized => (
            format!("{}/{}/{}", folder, FULL_DIR, image.filename),
            image.filename.clone(),
        ),
    }
}

/// `{brand}_{model}_{All|Selected}[_{format}].zip`, safe to use as a file name
pub fn archive_name(vehicle: &Vehicle, kind: ArchiveKind, format: Option<DownloadFormat>) -> String {
    let kind = kind.as_str();
    let name = match format {
        Some(f) => format!("{}_{}_{}_{}.zip", vehicle.brand, vehicle.model, kind, f.slug()),
        None => format!("{}_{}_{}.zip", vehicle.brand, vehicle.model, kind),
    };
    sanitize_file_name(&name)
}

// ============================================================================
// ASSET SOURCE
// ============================================================================

/// Where the catalog and images are read from
#[derive(Clone, Debug)]
pub enum AssetSource {
    Http { client: reqwest::Client, base: String },
    Dir(PathBuf),
}

impl AssetSource {
    /// `http://` / `https://` locations are served over HTTP, anything else is a directory
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Http {
                client: reqwest::Client::new(),
                base: trimmed.trim_end_matches('/').to_string(),
            }
        } else {
            Self::Dir(PathBuf::from(trimmed))
        }
    }

    /// Human-readable location of a relative asset path
    pub fn locate(&self, path: &str) -> String {
        match self {
            Self::Http { base, .. } => format!("{}/{}", base, path.trim_start_matches('/')),
            Self::Dir(root) => root.join(path).display().to_string(),
        }
    }

    pub async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        match self {
            Self::Http { client, .. } => {
                let url = self.locate(path);
                let response = client.get(&url).send().await?;
                if !response.status().is_success() {
                    return Err(FetchError::Status(response.status()));
                }
                let bytes = response.bytes().await?;
                debug!(url = %url, len = bytes.len(), "Fetched asset");
                Ok(bytes.to_vec())
            }
            Self::Dir(root) => Ok(tokio::fs::read(root.join(path)).await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(brand: &str) -> Vehicle {
        Vehicle {
            brand: brand.into(),
            model: "Tiggo 8".into(),
            year: "2023".into(),
            registration: "AB-123".into(),
            mileage: "12 000 km".into(),
            images: vec![Image { filename: "front.jpg".into(), caption: "Front".into() }],
        }
    }

    #[test]
    fn chery_has_its_own_folder() {
        assert_eq!(asset_folder("Chery"), "Chery");
        assert_eq!(asset_folder("DFSK"), "DFSK");
        assert_eq!(asset_folder("BYD"), "DFSK");
        assert_eq!(asset_folder("chery"), "DFSK");
    }

    #[test]
    fn stem_strips_only_last_extension() {
        assert_eq!(file_stem("front.jpg"), "front");
        assert_eq!(file_stem("a.b.png"), "a.b");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn view_paths_follow_variant() {
        let v = vehicle("Chery");
        let img = &v.images[0];
        assert_eq!(thumbnail_path(GalleryVariant::Basic, &v, img), "Chery/front.jpg");
        assert_eq!(thumbnail_path(GalleryVariant::Enhanced, &v, img), "Chery/thumbnails/front.webp");
        assert_eq!(lightbox_path(GalleryVariant::Basic, &v, img), "Chery/front.jpg");
        assert_eq!(lightbox_path(GalleryVariant::Enhanced, &v, img), "Chery/full/front.webp");
    }

    #[test]
    fn download_paths_follow_format() {
        let v = vehicle("BYD");
        let img = &v.images[0];
        assert_eq!(
            download_entry(DownloadFormat::Original, &v, img),
            ("DFSK/front.jpg".to_string(), "front.jpg".to_string())
        );
        assert_eq!(
            download_entry(DownloadFormat::Webp, &v, img),
            ("DFSK/full/front.webp".to_string(), "front.webp".to_string())
        );
        assert_eq!(
            download_entry(DownloadFormat::Optimized, &v, img),
            ("DFSK/full/front.jpg".to_string(), "front.jpg".to_string())
        );
    }

    #[test]
    fn archive_names() {
        let v = vehicle("Chery");
        assert_eq!(archive_name(&v, ArchiveKind::All, None), "Chery_Tiggo 8_All.zip");
        assert_eq!(
            archive_name(&v, ArchiveKind::Selected, Some(DownloadFormat::Webp)),
            "Chery_Tiggo 8_Selected_webp.zip"
        );

        let mut odd = vehicle("Chery");
        odd.model = "CS35/EV".into();
        assert_eq!(archive_name(&odd, ArchiveKind::All, None), "Chery_CS35_EV_All.zip");
        odd.model = "x/../../escaped".into();
        assert!(!archive_name(&odd, ArchiveKind::All, None).contains('/'));
    }

    #[test]
    fn http_locations_join_with_single_slash() {
        let source = AssetSource::from_location("https://cdn.example.com/gallery/");
        assert_eq!(source.locate("Chery/a.jpg"), "https://cdn.example.com/gallery/Chery/a.jpg");
        assert!(matches!(AssetSource::from_location("./site"), AssetSource::Dir(_)));
    }

    #[tokio::test]
    async fn dir_source_reads_files_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("DFSK")).unwrap();
        std::fs::write(dir.path().join("DFSK/a.jpg"), b"jpeg").unwrap();

        let source = AssetSource::Dir(dir.path().to_path_buf());
        assert_eq!(source.fetch("DFSK/a.jpg").await.unwrap(), b"jpeg");
        assert!(matches!(source.fetch("DFSK/missing.jpg").await, Err(FetchError::Io(_))));
    }
}
