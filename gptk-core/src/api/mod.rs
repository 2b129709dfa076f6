//! Port to the remote photo service.
//!
//! Transport, request signing and decoding of the service's reply shapes live
//! behind [`PhotosApi`]. Implementors hand back typed records or an error; a
//! reply that decodes to nothing usable (the service's rate-limit signature)
//! is reported as `Ok(None)` from the mutating and lookup calls so callers can
//! treat it as an empty contribution rather than a failure.

pub mod memory;

use async_trait::async_trait;
use gptk_model::{Album, AlbumKey, DedupKey, MediaItem, MediaKey, Page, SharedLink};

use crate::error::Result;

#[async_trait]
pub trait PhotosApi: Send + Sync {
    /// Library items taken at or before `timestamp`, newest first.
    async fn library_by_taken_date(
        &self,
        timestamp: Option<i64>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>>;

    /// Library items ordered by upload time, newest first.
    async fn library_by_upload_date(
        &self,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>>;

    async fn search(&self, query: &str, page_id: Option<&str>) -> Result<Page<MediaItem>>;

    async fn favorites(&self, page_id: Option<&str>) -> Result<Page<MediaItem>>;

    async fn trash(&self, page_id: Option<&str>) -> Result<Page<MediaItem>>;

    async fn locked_folder(&self, page_id: Option<&str>) -> Result<Page<MediaItem>>;

    /// Items a partner shares into this library.
    async fn partner_shared(&self, page_id: Option<&str>) -> Result<Page<MediaItem>>;

    async fn albums(&self, page_id: Option<&str>) -> Result<Page<Album>>;

    async fn shared_links(&self, page_id: Option<&str>) -> Result<Page<SharedLink>>;

    /// Items of an album, or of a shared link when `auth_key` carries the
    /// link id.
    async fn album_items(
        &self,
        album: &AlbumKey,
        auth_key: Option<&str>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>>;

    /// Bulk info lookup. Returned records carry only the fields the lookup
    /// provides and are merged over the listed ones by the caller.
    async fn batch_media_info(&self, keys: &[MediaKey]) -> Result<Option<Vec<MediaItem>>>;

    async fn move_to_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>>;

    async fn restore_from_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>>;

    async fn set_archived(
        &self,
        keys: &[DedupKey],
        archived: bool,
    ) -> Result<Option<Vec<DedupKey>>>;

    async fn set_favorite(
        &self,
        keys: &[DedupKey],
        favorite: bool,
    ) -> Result<Option<Vec<DedupKey>>>;

    /// Moves items into (`locked = true`) or out of the locked folder.
    async fn set_locked(&self, keys: &[DedupKey], locked: bool) -> Result<Option<Vec<DedupKey>>>;

    async fn add_to_album(
        &self,
        album: &AlbumKey,
        keys: &[MediaKey],
    ) -> Result<Option<Vec<MediaKey>>>;

    async fn create_album(&self, title: &str) -> Result<AlbumKey>;

    /// Moves one album item directly after `insert_after`, or to the front
    /// of the album when `insert_after` is `None`.
    async fn set_album_item_order(
        &self,
        album: &AlbumKey,
        item: &MediaKey,
        insert_after: Option<&MediaKey>,
    ) -> Result<()>;

    async fn set_description(
        &self,
        key: &DedupKey,
        description: &str,
    ) -> Result<Option<Vec<DedupKey>>>;
}
