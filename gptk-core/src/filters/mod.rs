//! The filter chain.
//!
//! Basic filters run first, then (only when an extended criterion or the
//! size sort asks for it) one enrichment pass through the bulk info lookup,
//! then the extended filters. Every step keeps input order and the chain
//! stops as soon as nothing is left.

pub mod basic;
pub mod extended;
pub mod validate;

use std::collections::HashMap;

use gptk_model::{Filter, MediaItem, MediaKey};
use tracing::{debug, info};

use crate::{api::PhotosApi, batch::BatchExecutor, error::Result, sources};

pub use validate::{validate, validate_filter};

pub struct FilterChain<'a> {
    api: &'a dyn PhotosApi,
    executor: &'a BatchExecutor,
    info_size: usize,
}

impl std::fmt::Debug for FilterChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("executor", self.executor)
            .field("info_size", &self.info_size)
            .finish_non_exhaustive()
    }
}

macro_rules! step {
    ($items:ident, $name:literal, $apply:expr) => {
        let before = $items.len();
        $items = $apply;
        debug!(
            filter = $name,
            before,
            after = $items.len(),
            "Filter applied"
        );
        if $items.is_empty() {
            info!(filter = $name, "No items left after filtering");
            return Ok($items);
        }
    };
}

impl<'a> FilterChain<'a> {
    pub fn new(api: &'a dyn PhotosApi, executor: &'a BatchExecutor, info_size: usize) -> Self {
        Self {
            api,
            executor,
            info_size,
        }
    }

    pub async fn apply(
        &self,
        mut items: Vec<MediaItem>,
        filter: &Filter,
    ) -> Result<Vec<MediaItem>> {
        if items.is_empty() {
            return Ok(items);
        }
        let cancel = self.executor.cancel_token();

        if filter.has_date_bounds() {
            step!(items, "date", basic::by_date(items, filter));
        }
        step!(
            items,
            "media-type",
            basic::by_media_type(items, filter.media_type)
        );
        step!(
            items,
            "archived",
            basic::by_archived(items, filter.archived)
        );
        step!(
            items,
            "favorite",
            basic::by_favorite(items, filter.favorite)
        );
        step!(items, "owned", basic::by_owned(items, filter.owned));
        step!(
            items,
            "upload-status",
            basic::by_upload_status(items, filter.upload_status)
        );

        if !filter.exclude_albums.is_empty() {
            let excluded =
                sources::album_dedup_keys(self.api, cancel, &filter.exclude_albums).await;
            step!(
                items,
                "exclude-albums",
                basic::without_keys(items, &excluded)
            );
        }
        if filter.exclude_shared {
            let excluded = sources::shared_dedup_keys(self.api, cancel).await;
            step!(
                items,
                "exclude-shared",
                basic::without_keys(items, &excluded)
            );
        }

        if !filter.needs_enrichment() {
            return Ok(items);
        }
        items = self.enrich(items).await;

        if let Some(pattern) = &filter.file_name_regex {
            let regex = extended::compile("file name", pattern)?;
            let match_type = filter.file_name_match_type;
            step!(
                items,
                "file-name",
                extended::by_pattern(items, &regex, match_type, extended::file_name)
            );
        }
        if let Some(pattern) = &filter.description_regex {
            let regex = extended::compile("description", pattern)?;
            let match_type = filter.description_match_type;
            step!(
                items,
                "description",
                extended::by_pattern(items, &regex, match_type, extended::description)
            );
        }
        if filter.has_size_bounds() {
            let lower = filter.lower_boundary_size;
            let upper = filter.higher_boundary_size;
            step!(items, "size", extended::by_size(items, lower, upper));
        }
        step!(
            items,
            "quality",
            extended::by_quality(items, filter.quality)
        );
        step!(items, "space", extended::by_space(items, filter.space));

        Ok(items)
    }

    /// Lays bulk-lookup records over `items`. Items the lookup did not return
    /// are kept as they were.
    pub async fn enrich(&self, items: Vec<MediaItem>) -> Vec<MediaItem> {
        let api = self.api;
        let keys: Vec<MediaKey> = items.iter().map(|item| item.media_key.clone()).collect();
        let details = self
            .executor
            .execute("batch_media_info", self.info_size, keys, |chunk| async move {
                api.batch_media_info(&chunk).await
            })
            .await;

        let by_key: HashMap<MediaKey, MediaItem> = details
            .into_iter()
            .map(|detail| (detail.media_key.clone(), detail))
            .collect();
        info!(
            items = items.len(),
            enriched = by_key.len(),
            "Enrichment finished"
        );

        items
            .into_iter()
            .map(|item| match by_key.get(&item.media_key) {
                Some(detail) => item.enriched_with(detail),
                None => item,
            })
            .collect()
    }
}
