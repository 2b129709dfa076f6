//! Album write path: capacity-aware adds with overflow albums, and the
//! follow-up reorder that makes an album match the order items were added in.

use std::collections::HashMap;

use gptk_model::{AlbumKey, DedupKey, MediaItem, MediaKey};
use tracing::{error, info, warn};

use crate::{
    api::PhotosApi,
    batch::BatchExecutor,
    config::ToolkitConfig,
    error::{Result, ToolkitError},
    sources,
};

/// How an add of `incoming` items is spread over the target album and any
/// overflow albums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPlan {
    /// Items that go into the target album itself.
    pub existing: usize,
    /// Sizes of the overflow albums to create, in order.
    pub overflow: Vec<usize>,
}

impl AlbumPlan {
    pub fn total(&self) -> usize {
        self.existing + self.overflow.iter().sum::<usize>()
    }
}

/// Fills the target's `remaining` room first, then cuts the rest into
/// albums of at most `capacity` items.
pub fn plan_album_batches(remaining: usize, incoming: usize, capacity: usize) -> AlbumPlan {
    let capacity = capacity.max(1);
    let existing = remaining.min(incoming);
    let mut rest = incoming - existing;
    let mut overflow = Vec::new();
    while rest > 0 {
        let take = rest.min(capacity);
        overflow.push(take);
        rest -= take;
    }
    AlbumPlan { existing, overflow }
}

/// Title of the `ordinal`-th album in a series. The target keeps its own
/// title; overflow albums count up from 2.
pub fn overflow_title(title: &str, ordinal: usize) -> String {
    if ordinal <= 1 {
        title.to_string()
    } else {
        format!("{title} ({ordinal})")
    }
}

/// Outcome of an album add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumAddition {
    /// Every album that received items, target first.
    pub albums: Vec<AlbumKey>,
    pub acknowledged: usize,
}

pub struct AlbumWriter<'a> {
    api: &'a dyn PhotosApi,
    executor: &'a BatchExecutor,
    config: &'a ToolkitConfig,
}

impl std::fmt::Debug for AlbumWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlbumWriter")
            .field("executor", self.executor)
            .field("album_capacity", &self.config.album_capacity)
            .finish_non_exhaustive()
    }
}

impl<'a> AlbumWriter<'a> {
    pub fn new(
        api: &'a dyn PhotosApi,
        executor: &'a BatchExecutor,
        config: &'a ToolkitConfig,
    ) -> Self {
        Self {
            api,
            executor,
            config,
        }
    }

    /// Adds to an album that already exists, spilling into new albums named
    /// after it once it is full.
    pub async fn add_to_existing(
        &self,
        album: &AlbumKey,
        keys: &[MediaKey],
    ) -> Result<AlbumAddition> {
        let cancel = self.executor.cancel_token();
        let target = sources::list_albums(self.api, cancel)
            .await
            .into_iter()
            .find(|candidate| &candidate.media_key == album)
            .ok_or_else(|| ToolkitError::NotFound(format!("album {album}")))?;

        let remaining = target.remaining_capacity(self.config.album_capacity);
        let album = album.clone();
        let title = &target.title;
        self.add_planned(album, title, remaining, keys).await
    }

    /// Creates an album titled `title` and adds to it, spilling into further
    /// albums once it is full.
    pub async fn add_to_new(&self, title: &str, keys: &[MediaKey]) -> Result<AlbumAddition> {
        let album = self.api.create_album(title).await?;
        info!(album = %album, title, "Created album");
        let capacity = self.config.album_capacity;
        self.add_planned(album, title, capacity, keys).await
    }

    async fn add_planned(
        &self,
        target: AlbumKey,
        title: &str,
        remaining: usize,
        keys: &[MediaKey],
    ) -> Result<AlbumAddition> {
        let plan = plan_album_batches(remaining, keys.len(), self.config.album_capacity);
        if !plan.overflow.is_empty() {
            info!(
                album = %target,
                remaining,
                overflow_albums = plan.overflow.len(),
                "Album capacity exceeded, spilling into new albums"
            );
        }

        let mut addition = AlbumAddition::default();
        let (head, mut rest) = keys.split_at(plan.existing);
        if !head.is_empty() {
            addition.acknowledged += self.add_chunked(&target, head).await;
        }
        addition.albums.push(target);

        for (offset, size) in plan.overflow.iter().copied().enumerate() {
            if self.executor.cancel_token().is_cancelled() {
                info!("Stop requested, no further overflow albums created");
                break;
            }
            let name = overflow_title(title, offset + 2);
            let album = self.api.create_album(&name).await?;
            info!(
                album = %album,
                title = %name,
                items = size,
                "Created overflow album"
            );

            let (batch, tail) = rest.split_at(size);
            rest = tail;
            addition.acknowledged += self.add_chunked(&album, batch).await;
            addition.albums.push(album);
        }

        Ok(addition)
    }

    async fn add_chunked(&self, album: &AlbumKey, keys: &[MediaKey]) -> usize {
        let api = self.api;
        self.executor
            .execute("add_to_album", self.config.operation_size, keys.to_vec(), |chunk| async move {
                api.add_to_album(album, &chunk).await
            })
            .await
            .len()
    }

    /// Reorders each album so that `items` appear in their given order at the
    /// front. Album entries that are not among `items` end up after them.
    ///
    /// Items are matched by operation key since an album holds its own copy of
    /// each item under a different media key. Calls go out one at a time;
    /// each moves one entry to the front, working from the last desired
    /// position to the first.
    pub async fn preserve_order(&self, albums: &[AlbumKey], items: &[MediaItem]) {
        let cancel = self.executor.cancel_token();
        let rank: HashMap<&DedupKey, usize> = items
            .iter()
            .enumerate()
            .map(|(position, item)| (&item.dedup_key, position))
            .collect();

        for album in albums {
            if cancel.is_cancelled() {
                break;
            }
            let mut entries = sources::album_items(self.api, cancel, album).await;
            entries.sort_by_key(|entry| {
                rank.get(&entry.dedup_key).copied().unwrap_or(usize::MAX)
            });

            let mut moved = 0usize;
            for entry in entries.iter().rev() {
                if cancel.is_cancelled() {
                    info!(
                        album = %album,
                        moved,
                        "Stop requested, reorder left incomplete"
                    );
                    return;
                }
                match self.api.set_album_item_order(album, &entry.media_key, None).await {
                    Ok(()) => moved += 1,
                    Err(err) => {
                        error!(
                            album = %album,
                            item = %entry.media_key,
                            error = %err,
                            "Failed to move album item"
                        );
                    }
                }
            }
            if moved < entries.len() {
                warn!(
                    album = %album,
                    moved,
                    total = entries.len(),
                    "Album order only partly restored"
                );
            } else {
                info!(album = %album, moved, "Album order restored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_full_album_overflows_into_one_more() {
        let plan = plan_album_batches(10, 19_999, 20_000);
        assert_eq!(plan.existing, 10);
        assert_eq!(plan.overflow, vec![19_989]);
    }

    #[test]
    fn twenty_items_into_ten_free_slots() {
        let plan = plan_album_batches(20_000 - 19_990, 20, 20_000);
        assert_eq!(plan.existing, 10);
        assert_eq!(plan.overflow, vec![10]);
        assert_eq!(plan.total(), 20);
    }

    #[test]
    fn full_album_sends_everything_to_overflow() {
        let plan = plan_album_batches(0, 45_000, 20_000);
        assert_eq!(plan.existing, 0);
        assert_eq!(plan.overflow, vec![20_000, 20_000, 5_000]);
    }

    #[test]
    fn items_that_fit_need_no_overflow() {
        let plan = plan_album_batches(20_000, 250, 20_000);
        assert_eq!(plan.existing, 250);
        assert!(plan.overflow.is_empty());
    }

    #[test]
    fn overflow_titles_count_from_two() {
        assert_eq!(overflow_title("Trip", 1), "Trip");
        assert_eq!(overflow_title("Trip", 2), "Trip (2)");
        assert_eq!(overflow_title("Trip", 3), "Trip (3)");
    }
}
