//! Page loops over the remote collections.
//!
//! Every loop checks the run's cancellation token before each fetch and stops
//! on the first failed page, handing back whatever accumulated. Neither case
//! is an error for the caller.

use std::future::Future;

use gptk_model::{IntervalType, MediaItem, Page};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{api::PhotosApi, error::Result, window::DateWindow};

/// Fetches pages until the service reports the final one.
pub async fn fetch_all<T, F, Fut>(cancel: &CancellationToken, label: &str, mut fetch: F) -> Vec<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut page_id: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if cancel.is_cancelled() {
            info!(
                source = label,
                pages,
                items = items.len(),
                "Fetch stopped by request"
            );
            break;
        }

        let page = match fetch(page_id.take()).await {
            Ok(page) => page,
            Err(err) => {
                error!(
                    source = label,
                    page = pages + 1,
                    error = %err,
                    "Page fetch failed, keeping partial results"
                );
                break;
            }
        };
        pages += 1;
        items.extend(page.items);
        debug!(
            source = label,
            page = pages,
            items = items.len(),
            "Page fetched"
        );

        match page.next_page_id {
            Some(next) => page_id = Some(next),
            None => break,
        }
    }

    info!(source = label, pages, items = items.len(), "Fetch finished");
    items
}

/// Library scan in capture order, narrowed to `window`.
pub async fn library_by_taken_date(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
    window: DateWindow,
) -> Vec<MediaItem> {
    if window.is_unbounded() {
        return fetch_all(cancel, "library", |page_id| async move {
            api.library_by_taken_date(None, page_id.as_deref()).await
        })
        .await;
    }

    let mut items = Vec::new();
    let mut timestamp = match window.interval {
        IntervalType::Include => (window.upper != i64::MAX).then_some(window.upper),
        IntervalType::Exclude => None,
    };
    let mut page_id: Option<String> = None;
    let mut pages = 0usize;
    let mut skipped_window = false;

    loop {
        if cancel.is_cancelled() {
            info!(
                source = "library",
                pages,
                items = items.len(),
                "Fetch stopped by request"
            );
            break;
        }

        let mut page = match api.library_by_taken_date(timestamp, page_id.as_deref()).await {
            Ok(page) => page,
            Err(err) => {
                error!(
                    source = "library",
                    page = pages + 1,
                    error = %err,
                    "Page fetch failed, keeping partial results"
                );
                break;
            }
        };
        pages += 1;
        page.items.retain(|item| window.keeps(item.timestamp));
        items.extend(page.items);

        let Some(next) = page.next_page_id else {
            break;
        };
        let cursor = page.last_item_timestamp;

        match window.interval {
            IntervalType::Include => {
                // Siblings sharing the lower bound's millisecond may still
                // follow, so only a cursor strictly below it ends the scan.
                if cursor.is_some_and(|ts| ts < window.lower) {
                    break;
                }
                page_id = Some(next);
                timestamp = cursor;
            }
            IntervalType::Exclude => {
                if !skipped_window && cursor.is_some_and(|ts| window.contains(ts)) {
                    debug!(
                        source = "library",
                        lower = window.lower,
                        "Skipping past the excluded window"
                    );
                    skipped_window = true;
                    timestamp = Some(window.lower.saturating_sub(1));
                    page_id = None;
                } else {
                    page_id = Some(next);
                    timestamp = cursor;
                }
            }
        }
    }

    info!(
        source = "library",
        pages,
        items = items.len(),
        "Fetch finished"
    );
    items
}

/// Library scan in upload order, narrowed to `window`.
pub async fn library_by_upload_date(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
    window: DateWindow,
) -> Vec<MediaItem> {
    let mut items = Vec::new();
    let mut page_id: Option<String> = None;
    let mut pages = 0usize;

    loop {
        if cancel.is_cancelled() {
            info!(
                source = "library",
                pages,
                items = items.len(),
                "Fetch stopped by request"
            );
            break;
        }

        let page = match api.library_by_upload_date(page_id.as_deref()).await {
            Ok(page) => page,
            Err(err) => {
                error!(
                    source = "library",
                    page = pages + 1,
                    error = %err,
                    "Page fetch failed, keeping partial results"
                );
                break;
            }
        };
        pages += 1;

        let passed_lower = window.interval == IntervalType::Include
            && page
                .items
                .last()
                .and_then(|item| item.creation_timestamp)
                .is_some_and(|ts| ts < window.lower);
        items.extend(
            page.items
                .into_iter()
                .filter(|item| window.keeps(item.creation_timestamp)),
        );

        match page.next_page_id {
            Some(next) if !passed_lower => page_id = Some(next),
            _ => break,
        }
    }

    info!(
        source = "library",
        pages,
        items = items.len(),
        "Fetch finished"
    );
    items
}
