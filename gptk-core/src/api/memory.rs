//! [`PhotosApi`] served from an in-process snapshot.
//!
//! Backs offline runs against a JSON export and the integration tests. List
//! pages are returned "thin" (without the fields only the bulk info lookup
//! provides) so the enrichment path is exercised exactly as it is against the
//! live service.

use std::{
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use gptk_model::{
    ALBUM_ITEM_LIMIT, Album, AlbumKey, DedupKey, MediaItem, MediaKey, Page, SharedLink,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PhotosApi;
use crate::error::{Result, ToolkitError};

const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LibrarySnapshot {
    pub library: Vec<MediaItem>,
    pub trash: Vec<MediaItem>,
    pub locked_folder: Vec<MediaItem>,
    pub partner_shared: Vec<MediaItem>,
    pub albums: Vec<AlbumSnapshot>,
    pub shared_links: Vec<SharedLinkSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSnapshot {
    pub album: Album,
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLinkSnapshot {
    pub link: SharedLink,
    #[serde(default)]
    pub items: Vec<MediaItem>,
}

impl LibrarySnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    fn album_mut(&mut self, key: &AlbumKey) -> Result<&mut AlbumSnapshot> {
        self.albums
            .iter_mut()
            .find(|entry| &entry.album.media_key == key)
            .ok_or_else(|| ToolkitError::NotFound(format!("album {key}")))
    }

    fn find_any(&self, key: &MediaKey) -> Option<&MediaItem> {
        self.library
            .iter()
            .chain(self.trash.iter())
            .chain(self.locked_folder.iter())
            .chain(self.partner_shared.iter())
            .chain(self.albums.iter().flat_map(|entry| &entry.items))
            .chain(self.shared_links.iter().flat_map(|entry| &entry.items))
            .find(|item| &item.media_key == key)
    }
}

#[derive(Debug)]
pub struct InMemoryPhotosApi {
    state: Mutex<LibrarySnapshot>,
    page_size: usize,
    album_capacity: usize,
}

impl InMemoryPhotosApi {
    pub fn new(snapshot: LibrarySnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
            page_size: DEFAULT_PAGE_SIZE,
            album_capacity: ALBUM_ITEM_LIMIT,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Album adds that would push an album past `capacity` are rejected, as
    /// the live service does at its own ceiling.
    pub fn with_album_capacity(mut self, capacity: usize) -> Self {
        self.album_capacity = capacity;
        self
    }

    pub fn snapshot(&self) -> Result<LibrarySnapshot> {
        Ok(self.state()?.clone())
    }

    fn state(&self) -> Result<MutexGuard<'_, LibrarySnapshot>> {
        self.state
            .lock()
            .map_err(|_| ToolkitError::Internal("snapshot lock poisoned".into()))
    }

    fn page_of<T: Clone>(
        &self,
        items: &[T],
        start: usize,
        map: impl Fn(&T) -> T,
    ) -> Page<T> {
        let end = (start + self.page_size).min(items.len());
        let start = start.min(end);
        Page {
            items: items[start..end].iter().map(map).collect(),
            next_page_id: (end < items.len()).then(|| end.to_string()),
            last_item_timestamp: None,
        }
    }

    fn media_page(&self, items: &[MediaItem], page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let start = parse_offset(page_id)?;
        Ok(self.page_of(items, start, listed))
    }
}

fn parse_offset(page_id: Option<&str>) -> Result<usize> {
    match page_id {
        None => Ok(0),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            let message = format!("unknown page id '{raw}'");
            ToolkitError::remote("page", message)
        }),
    }
}

/// The record as a list page reports it.
fn listed(item: &MediaItem) -> MediaItem {
    MediaItem {
        size: None,
        file_name: None,
        description_full: None,
        description_short: None,
        is_original_quality: None,
        takes_up_space: None,
        ..item.clone()
    }
}

fn newest_first(items: &mut [MediaItem], key: impl Fn(&MediaItem) -> Option<i64>) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item).unwrap_or(i64::MIN)));
}

fn take_matching(from: &mut Vec<MediaItem>, keys: &[DedupKey]) -> Vec<MediaItem> {
    let listed = |item: &MediaItem| keys.contains(&item.dedup_key);
    let (taken, kept): (Vec<_>, Vec<_>) = from.drain(..).partition(listed);
    *from = kept;
    taken
}

fn acknowledged(items: &[MediaItem]) -> Option<Vec<DedupKey>> {
    Some(items.iter().map(|item| item.dedup_key.clone()).collect())
}

#[async_trait]
impl PhotosApi for InMemoryPhotosApi {
    async fn library_by_taken_date(
        &self,
        timestamp: Option<i64>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>> {
        let mut items = self.state()?.library.clone();
        newest_first(&mut items, |item| item.timestamp);

        let start = match (page_id, timestamp) {
            (Some(_), _) => parse_offset(page_id)?,
            (None, Some(ts)) => items
                .iter()
                .position(|item| item.timestamp.unwrap_or(i64::MIN) <= ts)
                .unwrap_or(items.len()),
            (None, None) => 0,
        };

        let mut page = self.page_of(&items, start, listed);
        page.last_item_timestamp = page.items.last().and_then(|item| item.timestamp);
        Ok(page)
    }

    async fn library_by_upload_date(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let mut items = self.state()?.library.clone();
        newest_first(&mut items, |item| item.creation_timestamp);
        self.media_page(&items, page_id)
    }

    async fn search(&self, query: &str, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let needle = query.to_lowercase();
        let hits: Vec<MediaItem> = self
            .state()?
            .library
            .iter()
            .filter(|item| {
                [&item.file_name, &item.description_full, &item.description_short]
                    .into_iter()
                    .flatten()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        self.media_page(&hits, page_id)
    }

    async fn favorites(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let favorites: Vec<MediaItem> = self
            .state()?
            .library
            .iter()
            .filter(|item| item.is_favorite == Some(true))
            .cloned()
            .collect();
        self.media_page(&favorites, page_id)
    }

    async fn trash(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let items = self.state()?.trash.clone();
        self.media_page(&items, page_id)
    }

    async fn locked_folder(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let items = self.state()?.locked_folder.clone();
        self.media_page(&items, page_id)
    }

    async fn partner_shared(&self, page_id: Option<&str>) -> Result<Page<MediaItem>> {
        let items = self.state()?.partner_shared.clone();
        self.media_page(&items, page_id)
    }

    async fn albums(&self, page_id: Option<&str>) -> Result<Page<Album>> {
        let albums: Vec<Album> = self
            .state()?
            .albums
            .iter()
            .map(|entry| Album {
                item_count: entry.items.len(),
                ..entry.album.clone()
            })
            .collect();
        let start = parse_offset(page_id)?;
        Ok(self.page_of(&albums, start, Album::clone))
    }

    async fn shared_links(&self, page_id: Option<&str>) -> Result<Page<SharedLink>> {
        let links: Vec<SharedLink> = self
            .state()?
            .shared_links
            .iter()
            .map(|entry| SharedLink {
                item_count: entry.items.len(),
                ..entry.link.clone()
            })
            .collect();
        let start = parse_offset(page_id)?;
        Ok(self.page_of(&links, start, SharedLink::clone))
    }

    async fn album_items(
        &self,
        album: &AlbumKey,
        auth_key: Option<&str>,
        page_id: Option<&str>,
    ) -> Result<Page<MediaItem>> {
        let items = {
            let state = self.state()?;
            match auth_key {
                Some(link_id) => state
                    .shared_links
                    .iter()
                    .find(|entry| {
                        &entry.link.media_key == album && entry.link.link_id == link_id
                    })
                    .map(|entry| entry.items.clone()),
                None => state
                    .albums
                    .iter()
                    .find(|entry| &entry.album.media_key == album)
                    .map(|entry| entry.items.clone()),
            }
        }
        .ok_or_else(|| ToolkitError::NotFound(format!("album {album}")))?;

        self.media_page(&items, page_id)
    }

    async fn batch_media_info(&self, keys: &[MediaKey]) -> Result<Option<Vec<MediaItem>>> {
        let state = self.state()?;
        Ok(Some(
            keys.iter()
                .filter_map(|key| state.find_any(key).cloned())
                .collect(),
        ))
    }

    async fn move_to_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let moved = take_matching(&mut state.library, keys);
        let ack = acknowledged(&moved);
        state.trash.extend(moved);
        Ok(ack)
    }

    async fn restore_from_trash(&self, keys: &[DedupKey]) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let restored = take_matching(&mut state.trash, keys);
        let ack = acknowledged(&restored);
        state.library.extend(restored);
        Ok(ack)
    }

    async fn set_archived(
        &self,
        keys: &[DedupKey],
        archived: bool,
    ) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let mut ack = Vec::new();
        for item in state.library.iter_mut().filter(|item| keys.contains(&item.dedup_key)) {
            item.is_archived = Some(archived);
            ack.push(item.dedup_key.clone());
        }
        Ok(Some(ack))
    }

    async fn set_favorite(
        &self,
        keys: &[DedupKey],
        favorite: bool,
    ) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let mut ack = Vec::new();
        for item in state.library.iter_mut().filter(|item| keys.contains(&item.dedup_key)) {
            item.is_favorite = Some(favorite);
            ack.push(item.dedup_key.clone());
        }
        Ok(Some(ack))
    }

    async fn set_locked(&self, keys: &[DedupKey], locked: bool) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let moved = if locked {
            let moved = take_matching(&mut state.library, keys);
            state.locked_folder.extend(moved.iter().cloned());
            moved
        } else {
            let moved = take_matching(&mut state.locked_folder, keys);
            state.library.extend(moved.iter().cloned());
            moved
        };
        Ok(acknowledged(&moved))
    }

    async fn add_to_album(
        &self,
        album: &AlbumKey,
        keys: &[MediaKey],
    ) -> Result<Option<Vec<MediaKey>>> {
        let capacity = self.album_capacity;
        let mut state = self.state()?;
        let sources: Vec<MediaItem> = keys
            .iter()
            .filter_map(|key| state.find_any(key).cloned())
            .collect();

        let entry = state.album_mut(album)?;
        let fresh: Vec<MediaItem> = sources
            .into_iter()
            .filter(|item| {
                !entry.items.iter().any(|held| held.dedup_key == item.dedup_key)
            })
            .collect();
        if entry.items.len() + fresh.len() > capacity {
            return Err(ToolkitError::remote(
                "add_to_album",
                format!(
                    "album {album} holds {} items, adding {} exceeds {capacity}",
                    entry.items.len(),
                    fresh.len()
                ),
            ));
        }

        let mut ack = Vec::with_capacity(fresh.len());
        for item in fresh {
            ack.push(item.media_key.clone());
            // Album copies get their own key, like the live service hands out.
            entry.items.push(MediaItem {
                media_key: MediaKey::new(format!("{album}/{}", item.media_key)),
                ..item
            });
        }
        Ok(Some(ack))
    }

    async fn create_album(&self, title: &str) -> Result<AlbumKey> {
        let mut state = self.state()?;
        let key = AlbumKey::new(format!("album-{}", state.albums.len() + 1));
        debug!(album = %key, title, "Creating album");
        state.albums.push(AlbumSnapshot {
            album: Album::new(key.clone(), title),
            items: Vec::new(),
        });
        Ok(key)
    }

    async fn set_album_item_order(
        &self,
        album: &AlbumKey,
        item: &MediaKey,
        insert_after: Option<&MediaKey>,
    ) -> Result<()> {
        let mut state = self.state()?;
        let entry = state.album_mut(album)?;
        let from = entry
            .items
            .iter()
            .position(|held| &held.media_key == item)
            .ok_or_else(|| {
                ToolkitError::NotFound(format!("item {item} in album {album}"))
            })?;
        let moving = entry.items.remove(from);

        let to = match insert_after {
            None => 0,
            Some(anchor) => entry
                .items
                .iter()
                .position(|held| &held.media_key == anchor)
                .map(|idx| idx + 1)
                .ok_or_else(|| {
                    ToolkitError::NotFound(format!("item {anchor} in album {album}"))
                })?,
        };
        entry.items.insert(to, moving);
        Ok(())
    }

    async fn set_description(
        &self,
        key: &DedupKey,
        description: &str,
    ) -> Result<Option<Vec<DedupKey>>> {
        let mut state = self.state()?;
        let mut ack = Vec::new();
        for item in state.library.iter_mut().filter(|item| &item.dedup_key == key) {
            item.description_full = Some(description.to_string());
            ack.push(item.dedup_key.clone());
        }
        Ok(Some(ack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: i64) -> MediaItem {
        let mut item = MediaItem::new(format!("m{n}"), format!("d{n}"));
        item.timestamp = Some(n * 1_000);
        item.size = Some(n as u64);
        item
    }

    #[tokio::test]
    async fn taken_date_pages_start_below_the_requested_timestamp() {
        let api = InMemoryPhotosApi::new(LibrarySnapshot {
            library: (1..=10).map(item).collect(),
            ..LibrarySnapshot::default()
        })
        .with_page_size(3);

        let page = api.library_by_taken_date(Some(7_500), None).await.unwrap();
        let keys: Vec<_> = page.items.iter().map(|i| i.media_key.as_str()).collect();
        assert_eq!(keys, ["m7", "m6", "m5"]);
        assert_eq!(page.last_item_timestamp, Some(5_000));
        assert_eq!(page.next_page_id.as_deref(), Some("6"));
        // list pages never carry enrichment-only fields
        assert!(page.items.iter().all(|i| i.size.is_none()));
    }

    #[tokio::test]
    async fn trash_round_trip_moves_items_between_collections() {
        let api = InMemoryPhotosApi::new(LibrarySnapshot {
            library: (1..=3).map(item).collect(),
            ..LibrarySnapshot::default()
        });

        let keys = [DedupKey::new("d2")];
        let ack = api.move_to_trash(&keys).await.unwrap();
        assert_eq!(ack, Some(keys.to_vec()));
        let snapshot = api.snapshot().unwrap();
        assert_eq!(snapshot.library.len(), 2);
        assert_eq!(snapshot.trash.len(), 1);

        api.restore_from_trash(&keys).await.unwrap();
        assert_eq!(api.snapshot().unwrap().library.len(), 3);
    }

    #[tokio::test]
    async fn album_adds_respect_capacity() {
        let api = InMemoryPhotosApi::new(LibrarySnapshot {
            library: (1..=3).map(item).collect(),
            ..LibrarySnapshot::default()
        })
        .with_album_capacity(2);
        let album = api.create_album("Trip").await.unwrap();

        let keys: Vec<MediaKey> = ["m1", "m2", "m3"].into_iter().map(MediaKey::from).collect();
        assert!(api.add_to_album(&album, &keys).await.is_err());
        let added = api.add_to_album(&album, &keys[..2]).await.unwrap();
        assert!(added.is_some());
    }
}
