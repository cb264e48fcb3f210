//! Thumbnail and full-size image loading

use crate::assets::AssetSource;
use crate::utils::decode_image;
use eframe::egui;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Longest side kept for grid thumbnails
const THUMBNAIL_MAX_SIDE: u32 = 512;
const MAX_CONCURRENT_LOADS: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ImageKind {
    Thumbnail,
    Full,
}

pub enum ImageSlot {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

type SlotKey = (ImageKind, String);
type Finished = Arc<Mutex<Vec<(SlotKey, Option<egui::ColorImage>)>>>;

/// Texture cache keyed by kind and relative asset path. Fetch and decode happen on the
/// runtime; finished images are turned into textures on the UI thread.
pub struct ImageCache {
    source: AssetSource,
    runtime: tokio::runtime::Handle,
    semaphore: Arc<Semaphore>,
    slots: HashMap<SlotKey, ImageSlot>,
    finished: Finished,
}

impl ImageCache {
    pub fn new(source: AssetSource, runtime: tokio::runtime::Handle) -> Self {
        Self {
            source,
            runtime,
            semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_LOADS)),
            slots: HashMap::new(),
            finished: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Upload images decoded since the last frame
    pub fn poll(&mut self, ctx: &egui::Context) {
        let finished = std::mem::take(&mut *self.finished.lock().unwrap());
        for ((kind, path), image) in finished {
            let slot = match image {
                Some(image) => ImageSlot::Ready(ctx.load_texture(
                    format!("{:?}:{}", kind, path),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                None => ImageSlot::Failed,
            };
            self.slots.insert((kind, path), slot);
        }
    }

    /// Current state of `path`, starting a load on first request
    pub fn get(&mut self, ctx: &egui::Context, path: &str, kind: ImageKind) -> &ImageSlot {
        let key = (kind, path.to_string());
        if !self.slots.contains_key(&key) {
            self.spawn_load(ctx, key.clone());
            self.slots.insert(key.clone(), ImageSlot::Loading);
        }
        &self.slots[&key]
    }

    /// Thumbnail texture, falling back to `fallback` for this tile only when the
    /// thumbnail cannot be fetched or decoded
    pub fn thumbnail(
        &mut self,
        ctx: &egui::Context,
        path: &str,
        fallback: &str,
    ) -> Option<egui::TextureHandle> {
        match self.get(ctx, path, ImageKind::Thumbnail) {
            ImageSlot::Ready(tex) => return Some(tex.clone()),
            ImageSlot::Loading => return None,
            ImageSlot::Failed => {}
        }
        if path == fallback {
            return None;
        }
        match self.get(ctx, fallback, ImageKind::Thumbnail) {
            ImageSlot::Ready(tex) => Some(tex.clone()),
            _ => None,
        }
    }

    fn spawn_load(&self, ctx: &egui::Context, key: SlotKey) {
        let (kind, path) = key;
        let source = self.source.clone();
        let semaphore = self.semaphore.clone();
        let finished = self.finished.clone();
        let ctx = ctx.clone();
        let max_side = match kind {
            ImageKind::Thumbnail => Some(THUMBNAIL_MAX_SIDE),
            ImageKind::Full => None,
        };

        self.runtime.spawn(async move {
            let _permit = semaphore.acquire().await.ok();
            let image = match source.fetch(&path).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_image(&bytes, max_side))
                    .await
                    .ok()
                    .flatten(),
                Err(e) => {
                    warn!(path = %source.locate(&path), error = %e, "Image unavailable");
                    None
                }
            };
            if image.is_none() {
                debug!(path = %path, "No texture for image");
            }
            finished.lock().unwrap().push(((kind, path), image));
            ctx.request_repaint();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn site_with_original_only() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Chery")).unwrap();
        let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([0, 128, 0, 255]));
        img.save_with_format(dir.path().join("Chery/x.jpg"), image::ImageFormat::Png)
            .unwrap();
        dir
    }

    /// Poll until `done` holds or give up after a few seconds
    fn settle(
        cache: &mut ImageCache,
        ctx: &egui::Context,
        mut done: impl FnMut(&mut ImageCache) -> bool,
    ) -> bool {
        for _ in 0..300 {
            cache.poll(ctx);
            if done(cache) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn missing_thumbnail_falls_back_to_original() {
        let site = site_with_original_only();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new(
            AssetSource::Dir(site.path().to_path_buf()),
            runtime.handle().clone(),
        );

        let mut texture = None;
        let settled = settle(&mut cache, &ctx, |cache| {
            texture = cache.thumbnail(&ctx, "Chery/thumbnails/x.webp", "Chery/x.jpg");
            texture.is_some()
        });

        assert!(settled);
        assert_eq!(texture.unwrap().size(), [4, 3]);
        assert!(matches!(
            cache.get(&ctx, "Chery/thumbnails/x.webp", ImageKind::Thumbnail),
            ImageSlot::Failed
        ));
    }

    #[test]
    fn missing_thumbnail_without_distinct_fallback_gives_none() {
        let site = site_with_original_only();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut cache = ImageCache::new(
            AssetSource::Dir(site.path().to_path_buf()),
            runtime.handle().clone(),
        );

        let settled = settle(&mut cache, &ctx, |cache| {
            matches!(cache.get(&ctx, "DFSK/y.jpg", ImageKind::Thumbnail), ImageSlot::Failed)
        });

        assert!(settled);
        assert!(cache.thumbnail(&ctx, "DFSK/y.jpg", "DFSK/y.jpg").is_none());
        assert_eq!(cache.slots.len(), 1);
    }
}
