use crate::keys::AlbumKey;

/// Hard ceiling the remote service enforces on the number of items in one album.
pub const ALBUM_ITEM_LIMIT: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Album {
    pub media_key: AlbumKey,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item_count: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_shared: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub creation_timestamp: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modified_timestamp: Option<i64>,
}

impl Album {
    pub fn new(media_key: impl Into<AlbumKey>, title: impl Into<String>) -> Self {
        Self {
            media_key: media_key.into(),
            title: title.into(),
            item_count: 0,
            is_shared: false,
            creation_timestamp: None,
            modified_timestamp: None,
        }
    }

    /// Items that still fit before the album hits `capacity`.
    pub fn remaining_capacity(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.item_count)
    }
}

/// A collection shared by link. Its items are read like an album's, with the
/// link id passed along as the auth key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SharedLink {
    pub media_key: AlbumKey,
    pub link_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item_count: usize,
}
