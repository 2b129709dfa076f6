//! The bulk actions a run can end with.

use gptk_model::{AlbumKey, DedupKey, MediaItem, MediaKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    albums::AlbumWriter, api::PhotosApi, batch::BatchExecutor, config::ToolkitConfig,
    error::{Result, ToolkitError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Action {
    Trash,
    Restore,
    Archive,
    Unarchive,
    Favorite,
    Unfavorite,
    Lock,
    Unlock,
    AddToAlbum {
        album: AlbumKey,
        #[serde(default)]
        preserve_order: bool,
    },
    AddToNewAlbum {
        title: String,
        #[serde(default)]
        preserve_order: bool,
    },
    /// Writes the embedded ("other") description into the user description
    /// of every item whose user description is empty.
    CopyDescriptionFromOther,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Trash => "trash",
            Action::Restore => "restore",
            Action::Archive => "archive",
            Action::Unarchive => "unarchive",
            Action::Favorite => "favorite",
            Action::Unfavorite => "unfavorite",
            Action::Lock => "lock",
            Action::Unlock => "unlock",
            Action::AddToAlbum { .. } => "add-to-album",
            Action::AddToNewAlbum { .. } => "add-to-new-album",
            Action::CopyDescriptionFromOther => "copy-description-from-other",
        }
    }

    /// Whether the action reads fields only bulk info carries, so matched
    /// items must be enriched before it runs.
    pub fn needs_enrichment(&self) -> bool {
        matches!(self, Action::CopyDescriptionFromOther)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn dedup_keys(items: &[MediaItem]) -> Vec<DedupKey> {
    items.iter().map(|item| item.dedup_key.clone()).collect()
}

fn media_keys(items: &[MediaItem]) -> Vec<MediaKey> {
    items.iter().map(|item| item.media_key.clone()).collect()
}

/// Applies `action` to `items` and returns how many the service acknowledged.
///
/// Chunk failures are absorbed by the executor. The only errors surfaced here
/// are the ones that leave nothing to continue with, such as failing to
/// create the target album.
pub async fn dispatch(
    action: &Action,
    api: &dyn PhotosApi,
    executor: &BatchExecutor,
    config: &ToolkitConfig,
    items: &[MediaItem],
) -> Result<usize> {
    debug!(action = %action, items = items.len(), "Dispatching action");
    let size = config.operation_size;

    let affected = match action {
        Action::Trash => {
            executor
                .execute("move_to_trash", size, dedup_keys(items), |chunk| async move {
                    api.move_to_trash(&chunk).await
                })
                .await
                .len()
        }
        Action::Restore => {
            executor
                .execute("restore_from_trash", size, dedup_keys(items), |chunk| async move {
                    api.restore_from_trash(&chunk).await
                })
                .await
                .len()
        }
        Action::Archive | Action::Unarchive => {
            let archived = matches!(action, Action::Archive);
            executor
                .execute("set_archived", size, dedup_keys(items), |chunk| async move {
                    api.set_archived(&chunk, archived).await
                })
                .await
                .len()
        }
        Action::Favorite | Action::Unfavorite => {
            let favorite = matches!(action, Action::Favorite);
            executor
                .execute("set_favorite", size, dedup_keys(items), |chunk| async move {
                    api.set_favorite(&chunk, favorite).await
                })
                .await
                .len()
        }
        Action::Lock | Action::Unlock => {
            let locked = matches!(action, Action::Lock);
            executor
                .execute(
                    "set_locked",
                    config.locked_folder_operation_size,
                    dedup_keys(items),
                    |chunk| async move { api.set_locked(&chunk, locked).await },
                )
                .await
                .len()
        }
        Action::AddToAlbum {
            album,
            preserve_order,
        } => {
            let writer = AlbumWriter::new(api, executor, config);
            let added = writer.add_to_existing(album, &media_keys(items)).await?;
            if *preserve_order {
                writer.preserve_order(&added.albums, items).await;
            }
            added.acknowledged
        }
        Action::AddToNewAlbum {
            title,
            preserve_order,
        } => {
            let writer = AlbumWriter::new(api, executor, config);
            let added = writer.add_to_new(title, &media_keys(items)).await?;
            if *preserve_order {
                writer.preserve_order(&added.albums, items).await;
            }
            added.acknowledged
        }
        Action::CopyDescriptionFromOther => {
            let updates: Vec<(DedupKey, String)> = items
                .iter()
                .filter(|item| {
                    item.description_full.as_deref().is_none_or(str::is_empty)
                })
                .filter_map(|item| {
                    item.description_short
                        .as_deref()
                        .filter(|other| !other.is_empty())
                        .map(|other| (item.dedup_key.clone(), other.to_string()))
                })
                .collect();
            info!(eligible = updates.len(), "Copying embedded descriptions");
            executor
                .execute("set_description", 1, updates, |chunk| async move {
                    let mut acknowledged = Vec::new();
                    for (key, description) in &chunk {
                        match api.set_description(key, description).await? {
                            Some(keys) => acknowledged.extend(keys),
                            None => return Ok(None),
                        }
                    }
                    Ok::<_, ToolkitError>(Some(acknowledged))
                })
                .await
                .len()
        }
    };

    info!(action = %action, affected, "Action finished");
    Ok(affected)
}
