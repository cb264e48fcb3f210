//! Archive downloads
//!
//! Every entry of a request is fetched concurrently. Successful fetches are added
//! to an in-memory zip in completion order; failures are logged and left out.
//! Once every fetch has settled the archive is written to the download folder.

use crate::assets::AssetSource;
use crate::error::{GalleryError, Result};
use crate::gallery::{DownloadEntry, DownloadRequest};
use crate::types::{DownloadState, DownloadStatus};
use crate::utils::sanitize_file_name;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub path: PathBuf,
    pub members: Vec<String>,
    pub failed: Vec<String>,
}

/// Fetch, pack and save. `Ok(None)` for an empty request: nothing is fetched or written.
pub async fn download_images(
    source: &AssetSource,
    request: &DownloadRequest,
    dest_dir: &Path,
    state: Option<&Mutex<DownloadState>>,
) -> Result<Option<ArchiveOutcome>> {
    if request.entries.is_empty() {
        return Ok(None);
    }

    let total = request.entries.len();
    let report = |f: &dyn Fn(&mut DownloadState)| {
        if let Some(state) = state {
            f(&mut *state.lock().unwrap());
        }
    };
    report(&|s| {
        s.archive_name = request.archive_name.clone();
        s.status = Some(DownloadStatus::Fetching { done: 0, total });
    });

    let mut pending: FuturesUnordered<_> = request
        .entries
        .iter()
        .map(|entry| async move { (entry, source.fetch(&entry.source_path).await) })
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut members = Vec::new();
    let mut failed = Vec::new();
    let mut names = HashSet::new();
    let mut settled = 0;

    while let Some((entry, result)) = pending.next().await {
        settled += 1;
        match result {
            Ok(_) if !names.insert(entry.member_name.as_str()) => {
                warn!(member = %entry.member_name, "Duplicate archive member skipped");
                failed.push(entry.source_path.clone());
                report(&|s| s.failed += 1);
            }
            Ok(bytes) => match add_member(&mut zip, options, entry, &bytes) {
                Ok(()) => {
                    members.push(entry.member_name.clone());
                    report(&|s| {
                        s.fetched += 1;
                        s.total_bytes += bytes.len() as u64;
                    });
                }
                Err(e) => {
                    warn!(member = %entry.member_name, error = %e, "Failed to add archive member");
                    failed.push(entry.source_path.clone());
                    report(&|s| s.failed += 1);
                }
            },
            Err(e) => {
                warn!(path = %source.locate(&entry.source_path), error = %e, "Failed to fetch image");
                failed.push(entry.source_path.clone());
                report(&|s| s.failed += 1);
            }
        }
        report(&|s| s.status = Some(DownloadStatus::Fetching { done: settled, total }));
    }

    report(&|s| s.status = Some(DownloadStatus::Packing));
    let bytes = zip.finish()?.into_inner();

    tokio::fs::create_dir_all(dest_dir).await?;
    let name = sanitize_file_name(&request.archive_name);
    if dest_dir.join(&name).parent() != Some(dest_dir) {
        return Err(GalleryError::ArchiveOutsideFolder(request.archive_name.clone()));
    }
    let (path, mut file) = create_free_file(dest_dir, &name).await?;
    if let Err(e) = write_all(&mut file, &bytes).await {
        tokio::fs::remove_file(&path).await.ok();
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        members = members.len(),
        failed = failed.len(),
        size = bytes.len(),
        "Archive saved"
    );
    report(&|s| s.status = Some(DownloadStatus::Saved(path.clone())));

    Ok(Some(ArchiveOutcome { path, members, failed }))
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// Create `name` in `dir`, or `stem (n).ext` with the first free `n` when it is taken.
/// Existing archives are never replaced.
async fn create_free_file(dir: &Path, name: &str) -> io::Result<(PathBuf, tokio::fs::File)> {
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut n = 0u32;
    loop {
        let candidate = match (n, ext) {
            (0, _) => name.to_string(),
            (n, Some(ext)) => format!("{} ({}).{}", stem, n, ext),
            (n, None) => format!("{} ({})", stem, n),
        };
        let path = dir.join(candidate);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

fn add_member(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entry: &DownloadEntry,
    bytes: &[u8],
) -> Result<()> {
    zip.start_file(entry.member_name.as_str(), options)?;
    zip.write_all(bytes)?;
    Ok(())
}

/// Run a download on the app runtime, publishing progress to `state`
pub fn spawn_download(
    runtime: &tokio::runtime::Runtime,
    source: AssetSource,
    request: DownloadRequest,
    dest_dir: PathBuf,
    state: Arc<Mutex<DownloadState>>,
    ctx: egui::Context,
) {
    info!(archive = %request.archive_name, count = request.entries.len(), "Starting archive download");
    runtime.spawn(async move {
        match download_images(&source, &request, &dest_dir, Some(&state)).await {
            Ok(Some(outcome)) => debug!(
                path = %outcome.path.display(),
                members = outcome.members.len(),
                failed = ?outcome.failed,
                "Download job finished"
            ),
            Ok(None) => {}
            Err(e) => {
                error!(archive = %request.archive_name, error = %e, "Archive download failed");
                state.lock().unwrap().status = Some(DownloadStatus::Failed);
            }
        }
        ctx.request_repaint();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry(path: &str) -> DownloadEntry {
        DownloadEntry {
            source_path: path.to_string(),
            member_name: path.rsplit('/').next().unwrap().to_string(),
        }
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Chery")).unwrap();
        std::fs::write(dir.path().join("Chery/a.jpg"), b"aaaa").unwrap();
        std::fs::write(dir.path().join("Chery/c.jpg"), b"cccccc").unwrap();
        dir
    }

    fn read_members(path: &Path) -> Vec<(String, Vec<u8>)> {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut out = Vec::new();
        for i in 0..archive.len() {
            let mut member = archive.by_index(i).unwrap();
            let mut buf = Vec::new();
            member.read_to_end(&mut buf).unwrap();
            out.push((member.name().to_string(), buf));
        }
        out.sort();
        out
    }

    #[tokio::test]
    async fn empty_request_is_a_no_op() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(site.path().to_path_buf());
        let request = DownloadRequest { archive_name: "x.zip".into(), entries: Vec::new() };
        let state = Mutex::new(DownloadState::default());

        let result = download_images(&source, &request, out.path(), Some(&state)).await.unwrap();
        assert!(result.is_none());
        assert!(!out.path().join("x.zip").exists());
        assert!(state.lock().unwrap().status.is_none());
    }

    #[tokio::test]
    async fn failed_fetch_is_left_out() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(site.path().to_path_buf());
        let request = DownloadRequest {
            archive_name: "Chery_Tiggo_All.zip".into(),
            entries: vec![entry("Chery/a.jpg"), entry("Chery/b.jpg"), entry("Chery/c.jpg")],
        };
        let state = Mutex::new(DownloadState::default());

        let outcome = download_images(&source, &request, out.path(), Some(&state))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.failed, vec!["Chery/b.jpg".to_string()]);
        assert_eq!(outcome.members.len(), 2);
        assert_eq!(
            read_members(&outcome.path),
            vec![("a.jpg".to_string(), b"aaaa".to_vec()), ("c.jpg".to_string(), b"cccccc".to_vec())]
        );

        let s = state.lock().unwrap();
        assert_eq!(s.fetched, 2);
        assert_eq!(s.failed, 1);
        assert_eq!(s.total_bytes, 10);
        assert_eq!(s.status, Some(DownloadStatus::Saved(outcome.path.clone())));
    }

    #[tokio::test]
    async fn all_failed_still_writes_an_archive() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(site.path().to_path_buf());
        let request = DownloadRequest {
            archive_name: "empty.zip".into(),
            entries: vec![entry("DFSK/missing.jpg")],
        };

        let outcome = download_images(&source, &request, out.path(), None).await.unwrap().unwrap();
        assert!(outcome.members.is_empty());
        assert!(read_members(&outcome.path).is_empty());
    }

    #[tokio::test]
    async fn archive_names_from_the_catalog_stay_in_the_folder() {
        let site = site();
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("Downloads");
        let source = AssetSource::Dir(site.path().to_path_buf());

        for raw in ["Chery_CS35/EV_All.zip", "Chery_x/../../escaped_All.zip"] {
            let request = DownloadRequest {
                archive_name: raw.into(),
                entries: vec![entry("Chery/a.jpg")],
            };
            let outcome = download_images(&source, &request, &out, None).await.unwrap().unwrap();
            assert_eq!(outcome.path.parent(), Some(out.as_path()));
            assert_eq!(read_members(&outcome.path).len(), 1);
        }
        assert!(!root.path().join("escaped_All.zip").exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn existing_archives_are_kept() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(site.path().to_path_buf());
        let state = Mutex::new(DownloadState::default());

        let first = DownloadRequest {
            archive_name: "Chery_Tiggo_Selected.zip".into(),
            entries: vec![entry("Chery/a.jpg")],
        };
        let second = DownloadRequest {
            archive_name: "Chery_Tiggo_Selected.zip".into(),
            entries: vec![entry("Chery/c.jpg")],
        };
        let a = download_images(&source, &first, out.path(), None).await.unwrap().unwrap();
        let c = download_images(&source, &second, out.path(), Some(&state)).await.unwrap().unwrap();

        assert_eq!(a.path, out.path().join("Chery_Tiggo_Selected.zip"));
        assert_eq!(c.path, out.path().join("Chery_Tiggo_Selected (1).zip"));
        assert_eq!(read_members(&a.path)[0].0, "a.jpg");
        assert_eq!(read_members(&c.path)[0].0, "c.jpg");
        assert_eq!(
            state.lock().unwrap().status,
            Some(DownloadStatus::Saved(c.path.clone()))
        );
    }

    #[tokio::test]
    async fn duplicate_member_names_keep_the_first() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let source = AssetSource::Dir(site.path().to_path_buf());
        let request = DownloadRequest {
            archive_name: "dup.zip".into(),
            entries: vec![entry("Chery/a.jpg"), entry("Chery/a.jpg")],
        };

        let outcome = download_images(&source, &request, out.path(), None).await.unwrap().unwrap();
        assert_eq!(outcome.members, vec!["a.jpg".to_string()]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(read_members(&outcome.path).len(), 1);
    }
}
