#![allow(dead_code)]

use std::{
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use gptk_core::{
    RunState, ToolkitError,
    api::{
        PhotosApi,
        memory::{InMemoryPhotosApi, LibrarySnapshot},
    },
    error::Result,
    similarity::ThumbnailSource,
};
use gptk_model::{Album, AlbumKey, DedupKey, MediaItem, MediaKey, Page, SharedLink};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

/// A library item `n` days after the epoch, with every enrichment field set.
pub fn item(n: i64) -> MediaItem {
    let mut item = MediaItem::new(format!("m{n}"), format!("d{n}"));
    item.timestamp = Some(n * DAY_MS);
    item.creation_timestamp = Some(n * DAY_MS + 1);
    item.size = Some(n as u64 * 1_000);
    item.file_name = Some(format!("IMG_{n:04}.jpg"));
    item.is_original_quality = Some(true);
    item.takes_up_space = Some(true);
    item.is_owned = Some(true);
    item
}

pub fn library(range: std::ops::RangeInclusive<i64>) -> LibrarySnapshot {
    LibrarySnapshot {
        library: range.map(item).collect(),
        ..LibrarySnapshot::default()
    }
}

pub fn keys(items: &[MediaItem]) -> Vec<String> {
    let key = |item: &MediaItem| item.media_key.to_string();
    items.iter().map(key).collect()
}

/// Wraps the in-memory API to fail, count or intercept calls.
pub struct ScriptedApi {
    pub inner: InMemoryPhotosApi,
    /// 1-based call numbers of library page requests that fail.
    pub failing_pages: Vec<usize>,
    pub page_calls: AtomicUsize,
    pub requested_timestamps: Mutex<Vec<Option<i64>>>,
    /// Cancelled on the first library page request.
    pub cancel_on_fetch: Option<RunState>,
    /// Delay added to every bulk info lookup.
    pub info_delay: Option<Duration>,
    /// Chunk sizes of lock folder moves, in completion order.
    pub lock_chunks: Mutex<Vec<usize>>,
}

impl ScriptedApi {
    pub fn new(inner: InMemoryPhotosApi) -> Self {
        Self {
            inner,
            failing_pages: Vec::new(),
            page_calls: AtomicUsize::new(0),
            requested_timestamps: Mutex::new(Vec::new()),
            cancel_on_fetch: None,
            info_delay: None,
            lock_chunks: Mutex::new(Vec::new()),
        }
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Lock folder chunk sizes, smallest first.
    pub fn lock_chunks(&self) -> Vec<usize> {
        let mut chunks = self.lock_chunks.lock().unwrap().clone();
        chunks.sort_unstable();
        chunks
    }

    fn library_call(&self) -> Result<()> {
        let call = self.page_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(state) = &self.cancel_on_fetch {
            state.cancel();
        }
        if self.failing_pages.contains(&call) {
            let message = format!("page {call} unavailable");
            return Err(ToolkitError::remote("library", message));
        }
        Ok(())
    }
}

#[async_trait]
impl PhotosApi for ScriptedApi {
    async fn library_by_taken_date(
        &self,
        timestamp: Option<i64>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>> {
        self.requested_timestamps.lock().unwrap().push(timestamp);
        self.library_call()?;
        self.inner.library_by_taken_date(timestamp, page_id).await
    }

    async fn library_by_upload_date(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.library_call()?;
        self.inner.library_by_upload_date(page_id).await
    }

    async fn search(&self, query: &str, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.inner.search(query, page_id).await
    }

    async fn favorites(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.inner.favorites(page_id).await
    }

    async fn trash(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.inner.trash(page_id).await
    }

    async fn locked_folder(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.inner.locked_folder(page_id).await
    }

    async fn partner_shared(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        self.inner.partner_shared(page_id).await
    }

    async fn albums(&self, page_id: Option<&str>) -> Result<Page<Album>> {
        self.inner.albums(page_id).await
    }

    async fn shared_links(&self, page_id: Option<&str>) -> Result<Page<SharedLink>> {
        self.inner.shared_links(page_id).await
    }

    async fn album_items(
        &self,
        album: &AlbumKey,
        auth_key: Option<&str>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>> {
        self.inner.album_items(album, auth_key, page_id).await
    }

    async fn batch_media_info(&self, keys: &[MediaKey]) -> Result<Option<Vec<MediaItem>>> {
        if let Some(delay) = self.info_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.batch_media_info(keys).await
    }

    async fn move_to_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>> {
        self.inner.move_to_trash(keys).await
    }

    async fn restore_from_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>> {
        self.inner.restore_from_trash(keys).await
    }

    async fn set_archived(
        &self,
        keys: &[DedupKey],
        archived: bool,
    ) -> Result<Option<Vec<DedupKey>>> {
        self.inner.set_archived(keys, archived).await
    }

    async fn set_favorite(
        &self,
        keys: &[DedupKey],
        favorite: bool,
    ) -> Result<Option<Vec<DedupKey>>> {
        self.inner.set_favorite(keys, favorite).await
    }

    async fn set_locked(&self, keys: &[DedupKey], locked: bool) -> Result<Option<Vec<DedupKey>>> {
        self.lock_chunks.lock().unwrap().push(keys.len());
        self.inner.set_locked(keys, locked).await
    }

    async fn add_to_album(
        &self,
        album: &AlbumKey,
        keys: &[MediaKey],
    ) -> Result<Option<Vec<MediaKey>>> {
        self.inner.add_to_album(album, keys).await
    }

    async fn create_album(&self, title: &str) -> Result<AlbumKey> {
        self.inner.create_album(title).await
    }

    async fn set_album_item_order(
        &self,
        album: &AlbumKey,
        item: &MediaKey,
        insert_after: Option<&MediaKey>,
    ) -> Result<()> {
        let inner = &self.inner;
        inner.set_album_item_order(album, item, insert_after).await
    }

    async fn set_description(
        &self,
        key: &DedupKey,
        description: &str,
    ) -> Result<Option<Vec<DedupKey>>> {
        self.inner.set_description(key, description).await
    }
}

/// Renders a PNG whose brightness falls left to right (`falling = true`) or
/// rises, with `noise` adding a small per-pixel wobble.
pub fn gradient_png(falling: bool, noise: u8) -> Vec<u8> {
    let image = RgbImage::from_fn(64, 48, |x, y| {
        let base = (x * 255 / 63) as u8;
        let level = if falling { 255 - base } else { base };
        let wobble = if (x + y) % 2 == 0 { noise } else { 0 };
        Rgb([level.saturating_sub(wobble); 3])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Serves prepared images keyed by thumbnail base URL; any URL can be made
/// to fail a number of times before it succeeds.
#[derive(Default)]
pub struct SyntheticThumbnails {
    pub images: Mutex<Vec<(String, Vec<u8>)>>,
    pub failures_left: Mutex<Vec<(String, u32)>>,
    pub requests: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
}

impl SyntheticThumbnails {
    pub fn with(images: Vec<(&str, Vec<u8>)>) -> Self {
        Self {
            images: Mutex::new(
                images
                    .into_iter()
                    .map(|(base, bytes)| (base.to_string(), bytes))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing(self, base: &str, times: u32) -> Self {
        let entry = (base.to_string(), times);
        self.failures_left.lock().unwrap().push(entry);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ThumbnailSource for SyntheticThumbnails {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let base = url.rsplit_once("=h").map_or(url, |(base, _)| base);

        {
            let mut failures = self.failures_left.lock().unwrap();
            let flaky = failures
                .iter_mut()
                .find(|(key, left)| key == base && *left > 0);
            if let Some((_, left)) = flaky {
                *left -= 1;
                return Err(ToolkitError::remote("thumbnail", "flaky"));
            }
        }

        self.images
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| key == base)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ToolkitError::NotFound(base.to_string()))
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
