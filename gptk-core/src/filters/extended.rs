//! Filters over fields only the bulk info lookup provides.

use std::cmp::Reverse;

use gptk_model::{MatchType, MediaItem, Quality, SpaceConsumption};
use regex::Regex;

use super::basic::tri_state;
use crate::error::ConfigError;

pub fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex { field, source })
}

/// Keeps matches for [`MatchType::Include`] and non-matches for
/// [`MatchType::Exclude`]. An absent field is matched as `""`.
pub fn by_pattern<F>(
    mut items: Vec<MediaItem>,
    regex: &Regex,
    match_type: MatchType,
    field: F,
) -> Vec<MediaItem>
where
    F: Fn(&MediaItem) -> Option<&str>,
{
    items.retain(|item| {
        let hit = regex.is_match(field(item).unwrap_or(""));
        match match_type {
            MatchType::Include => hit,
            MatchType::Exclude => !hit,
        }
    });
    items
}

pub fn file_name(item: &MediaItem) -> Option<&str> {
    item.file_name.as_deref()
}

pub fn description(item: &MediaItem) -> Option<&str> {
    item.description_full.as_deref()
}

/// Inclusive size window. Items whose size is still unknown cannot be shown
/// to fall inside it and are dropped.
pub fn by_size(
    mut items: Vec<MediaItem>,
    lower: Option<u64>,
    upper: Option<u64>,
) -> Vec<MediaItem> {
    if lower.is_none() && upper.is_none() {
        return items;
    }
    let lower = lower.unwrap_or(0);
    let upper = upper.unwrap_or(u64::MAX);
    items.retain(|item| {
        item.size.is_some_and(|size| lower <= size && size <= upper)
    });
    items
}

pub fn by_quality(mut items: Vec<MediaItem>, quality: Option<Quality>) -> Vec<MediaItem> {
    let wanted = quality.map(|quality| quality == Quality::Original);
    items.retain(|item| tri_state(item.is_original_quality, wanted));
    items
}

pub fn by_space(mut items: Vec<MediaItem>, space: Option<SpaceConsumption>) -> Vec<MediaItem> {
    let wanted = space.map(|space| space == SpaceConsumption::Consuming);
    items.retain(|item| tri_state(item.takes_up_space, wanted));
    items
}

/// Largest first. Items of unknown size go last; ties keep their order.
pub fn sort_by_size(items: &mut [MediaItem]) {
    items.sort_by_key(|item| {
        Reverse(item.size.map_or(0, |size| size.saturating_add(1)))
    });
}
