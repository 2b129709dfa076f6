use crate::keys::{DedupKey, MediaKey};

/// Pixel dimensions reported for an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
}

/// One media asset.
///
/// List pages only populate a subset of these fields; the rest arrive through
/// the bulk info lookup (see [`MediaItem::enriched_with`]). `None` means "not
/// fetched yet", which filters treat differently from a confirmed value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MediaItem {
    pub media_key: MediaKey,
    pub dedup_key: DedupKey,
    /// Capture time, milliseconds since the Unix epoch.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<i64>,
    /// Upload time, milliseconds since the Unix epoch.
    #[cfg_attr(feature = "serde", serde(default))]
    pub creation_timestamp: Option<i64>,
    /// Offset from UTC in milliseconds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timezone_offset: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thumb: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolution: Option<Resolution>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_archived: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_favorite: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_owned: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_partial_upload: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_live_photo: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_original_quality: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub takes_up_space: Option<bool>,
    /// Playback length in milliseconds. Only videos carry one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u64>,
    /// Bytes consumed by the original. Enrichment only.
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub file_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description_full: Option<String>,
    /// Description embedded in the file itself (the "other" description).
    #[cfg_attr(feature = "serde", serde(default))]
    pub description_short: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub geo_location: Option<GeoLocation>,
}

impl MediaItem {
    /// A bare record carrying only its keys, as the thinnest list pages do.
    pub fn new(media_key: impl Into<MediaKey>, dedup_key: impl Into<DedupKey>) -> Self {
        Self {
            media_key: media_key.into(),
            dedup_key: dedup_key.into(),
            timestamp: None,
            creation_timestamp: None,
            timezone_offset: None,
            thumb: None,
            resolution: None,
            is_archived: None,
            is_favorite: None,
            is_owned: None,
            is_partial_upload: None,
            is_live_photo: None,
            is_original_quality: None,
            takes_up_space: None,
            duration: None,
            size: None,
            file_name: None,
            description_full: None,
            description_short: None,
            geo_location: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.duration.is_some()
    }

    /// Returns a new record with every field `update` knows about laid over
    /// this one. Keys are never replaced.
    pub fn enriched_with(&self, update: &MediaItem) -> MediaItem {
        fn pick<T: Clone>(newer: &Option<T>, older: &Option<T>) -> Option<T> {
            newer.clone().or_else(|| older.clone())
        }

        MediaItem {
            media_key: self.media_key.clone(),
            dedup_key: self.dedup_key.clone(),
            timestamp: pick(&update.timestamp, &self.timestamp),
            creation_timestamp: pick(
                &update.creation_timestamp,
                &self.creation_timestamp,
            ),
            timezone_offset: pick(&update.timezone_offset, &self.timezone_offset),
            thumb: pick(&update.thumb, &self.thumb),
            resolution: pick(&update.resolution, &self.resolution),
            is_archived: pick(&update.is_archived, &self.is_archived),
            is_favorite: pick(&update.is_favorite, &self.is_favorite),
            is_owned: pick(&update.is_owned, &self.is_owned),
            is_partial_upload: pick(
                &update.is_partial_upload,
                &self.is_partial_upload,
            ),
            is_live_photo: pick(&update.is_live_photo, &self.is_live_photo),
            is_original_quality: pick(
                &update.is_original_quality,
                &self.is_original_quality,
            ),
            takes_up_space: pick(&update.takes_up_space, &self.takes_up_space),
            duration: pick(&update.duration, &self.duration),
            size: pick(&update.size, &self.size),
            file_name: pick(&update.file_name, &self.file_name),
            description_full: pick(
                &update.description_full,
                &self.description_full,
            ),
            description_short: pick(
                &update.description_short,
                &self.description_short,
            ),
            geo_location: pick(&update.geo_location, &self.geo_location),
        }
    }
}
