//! Catalog loading

use crate::assets::AssetSource;
use crate::constants::CATALOG_PATH;
use crate::error::Result;
use crate::types::Vehicle;
use tracing::info;

/// Parse a catalog document: a JSON array of vehicles
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<Vehicle>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read the catalog once from the asset source root
pub async fn load_catalog(source: &AssetSource) -> Result<Vec<Vehicle>> {
    let bytes = source.fetch(CATALOG_PATH).await?;
    let vehicles = parse_catalog(&bytes)?;
    info!(
        vehicles = vehicles.len(),
        images = vehicles.iter().map(|v| v.images.len()).sum::<usize>(),
        source = %source.locate(CATALOG_PATH),
        "Catalog loaded"
    );
    Ok(vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;

    const SAMPLE: &str = r#"[
        {"brand": "Chery", "model": "Tiggo 8", "year": 2023, "registration": "AB-123",
         "mileage": "12 000 km",
         "images": [{"filename": "a.jpg", "caption": "Front"}, {"filename": "b.jpg"}]},
        {"brand": "DFSK", "model": "Glory 580", "year": "2021", "registration": null,
         "mileage": 54000, "images": []}
    ]"#;

    #[test]
    fn parses_mixed_display_values() {
        let vehicles = parse_catalog(SAMPLE.as_bytes()).unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].year, "2023");
        assert_eq!(vehicles[0].images[1].caption, "");
        assert_eq!(vehicles[1].year, "2021");
        assert_eq!(vehicles[1].registration, "");
        assert_eq!(vehicles[1].mileage, "54000");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_catalog(b"{not json"), Err(GalleryError::Json(_))));
    }

    #[tokio::test]
    async fn loads_from_directory_and_reports_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(dir.path().to_path_buf());
        assert!(matches!(load_catalog(&source).await, Err(GalleryError::Fetch(_))));

        std::fs::write(dir.path().join(CATALOG_PATH), SAMPLE).unwrap();
        let vehicles = load_catalog(&source).await.unwrap();
        assert_eq!(vehicles[0].brand, "Chery");
        assert_eq!(vehicles[0].images.len(), 2);
    }
}
