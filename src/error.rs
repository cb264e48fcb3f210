//! Error types for asset fetching and archive building

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive name leaves the download folder: {0}")]
    ArchiveOutsideFolder(String),
}

pub type Result<T, E = GalleryError> = std::result::Result<T, E>;
