//! Candidate fetches, one per [`Source`].

use std::collections::HashSet;

use gptk_model::{Album, AlbumKey, DateType, DedupKey, Filter, MediaItem, SharedLink, Source};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    api::PhotosApi,
    paginate::{self, fetch_all},
    window::DateWindow,
};

/// Reads every candidate item of `source`. Library scans are narrowed to the
/// filter's date window while paging.
pub async fn fetch_source(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
    source: &Source,
    filter: &Filter,
) -> Vec<MediaItem> {
    info!(source = %source, "Fetching candidates");
    match source {
        Source::Library => {
            let window = DateWindow::from_filter(filter);
            match filter.date_type {
                DateType::Taken => paginate::library_by_taken_date(api, cancel, window).await,
                DateType::Uploaded if window.is_unbounded() => {
                    paginate::library_by_taken_date(api, cancel, window).await
                }
                DateType::Uploaded => {
                    paginate::library_by_upload_date(api, cancel, window).await
                }
            }
        }
        Source::Search { query } => {
            fetch_all(cancel, "search", |page_id| async move {
                api.search(query, page_id.as_deref()).await
            })
            .await
        }
        Source::Trash => {
            fetch_all(cancel, "trash", |page_id| async move {
                api.trash(page_id.as_deref()).await
            })
            .await
        }
        Source::LockedFolder => {
            fetch_all(cancel, "locked-folder", |page_id| async move {
                api.locked_folder(page_id.as_deref()).await
            })
            .await
        }
        Source::Favorites => {
            fetch_all(cancel, "favorites", |page_id| async move {
                api.favorites(page_id.as_deref()).await
            })
            .await
        }
        Source::PartnerShared => {
            fetch_all(cancel, "partner-shared", |page_id| async move {
                api.partner_shared(page_id.as_deref()).await
            })
            .await
        }
        Source::SharedLinks => shared_link_items(api, cancel).await,
        Source::Albums { albums } => {
            let mut items = Vec::new();
            for album in albums {
                if cancel.is_cancelled() {
                    break;
                }
                items.extend(album_items(api, cancel, album).await);
            }
            items
        }
    }
}

pub async fn list_albums(api: &dyn PhotosApi, cancel: &CancellationToken) -> Vec<Album> {
    fetch_all(cancel, "albums", |page_id| async move {
        api.albums(page_id.as_deref()).await
    })
    .await
}

pub async fn list_shared_links(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
) -> Vec<SharedLink> {
    fetch_all(cancel, "shared-links", |page_id| async move {
        api.shared_links(page_id.as_deref()).await
    })
    .await
}

pub async fn album_items(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
    album: &AlbumKey,
) -> Vec<MediaItem> {
    debug!(album = %album, "Fetching album items");
    fetch_all(cancel, "album", |page_id| async move {
        api.album_items(album, None, page_id.as_deref()).await
    })
    .await
}

/// Items of every shared link, in link order.
pub async fn shared_link_items(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
) -> Vec<MediaItem> {
    let links = list_shared_links(api, cancel).await;
    let mut items = Vec::new();
    for link in &links {
        if cancel.is_cancelled() {
            break;
        }
        let link_id = link.link_id.as_str();
        let key = &link.media_key;
        let auth = Some(link_id);
        items.extend(
            fetch_all(cancel, "shared-link", |page_id| async move {
                api.album_items(key, auth, page_id.as_deref()).await
            })
            .await,
        );
    }
    items
}

/// Operation keys of everything held in `albums`.
pub async fn album_dedup_keys(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
    albums: &[AlbumKey],
) -> HashSet<DedupKey> {
    let mut keys = HashSet::new();
    for album in albums {
        if cancel.is_cancelled() {
            break;
        }
        keys.extend(
            album_items(api, cancel, album)
                .await
                .into_iter()
                .map(|item| item.dedup_key),
        );
    }
    keys
}

/// Operation keys of everything reachable through a shared link.
pub async fn shared_dedup_keys(
    api: &dyn PhotosApi,
    cancel: &CancellationToken,
) -> HashSet<DedupKey> {
    shared_link_items(api, cancel)
        .await
        .into_iter()
        .map(|item| item.dedup_key)
        .collect()
}
