//! Filters over fields every list page already carries.
//!
//! Each function keeps a subset of its input in input order and is
//! idempotent.

use std::collections::HashSet;

use gptk_model::{DedupKey, Filter, MediaItem, MediaTypeFilter, UploadStatus};

use crate::window::{DateWindow, item_date};

/// Tri-state check: a wanted value rejects only a confirmed opposite. Items
/// whose flag is unknown pass either way.
pub fn tri_state(value: Option<bool>, wanted: Option<bool>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value != Some(!wanted),
    }
}

pub fn by_date(mut items: Vec<MediaItem>, filter: &Filter) -> Vec<MediaItem> {
    let window = DateWindow::from_filter(filter);
    if window.is_unbounded() {
        return items;
    }
    items.retain(|item| window.keeps(item_date(item, filter.date_type)));
    items
}

pub fn by_media_type(mut items: Vec<MediaItem>, media_type: MediaTypeFilter) -> Vec<MediaItem> {
    match media_type {
        MediaTypeFilter::All => {}
        MediaTypeFilter::Image => items.retain(|item| !item.is_video()),
        MediaTypeFilter::Video => items.retain(MediaItem::is_video),
        MediaTypeFilter::LivePhoto => items.retain(|item| item.is_live_photo == Some(true)),
    }
    items
}

pub fn by_archived(mut items: Vec<MediaItem>, wanted: Option<bool>) -> Vec<MediaItem> {
    items.retain(|item| tri_state(item.is_archived, wanted));
    items
}

pub fn by_favorite(mut items: Vec<MediaItem>, wanted: Option<bool>) -> Vec<MediaItem> {
    items.retain(|item| tri_state(item.is_favorite, wanted));
    items
}

pub fn by_owned(mut items: Vec<MediaItem>, wanted: Option<bool>) -> Vec<MediaItem> {
    items.retain(|item| tri_state(item.is_owned, wanted));
    items
}

pub fn by_upload_status(mut items: Vec<MediaItem>, status: Option<UploadStatus>) -> Vec<MediaItem> {
    let wanted_partial = status.map(|status| status == UploadStatus::Partial);
    items.retain(|item| tri_state(item.is_partial_upload, wanted_partial));
    items
}

/// Drops items whose operation key is in `excluded`.
pub fn without_keys(mut items: Vec<MediaItem>, excluded: &HashSet<DedupKey>) -> Vec<MediaItem> {
    if !excluded.is_empty() {
        items.retain(|item| !excluded.contains(&item.dedup_key));
    }
    items
}
