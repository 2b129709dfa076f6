//! Perceptual near-duplicate grouping.
//!
//! Thumbnails are downloaded by a fixed set of workers that pull from one
//! shared queue. Each download is retried with a linear backoff and bounded
//! by a per-attempt timeout. Decoding and hashing run on the blocking pool.
//! Items that cannot be downloaded or decoded drop out of the result;
//! cancellation ends the pass early with whatever was hashed so far.

pub mod dhash;
pub mod grouping;
pub mod thumbnails;

use std::sync::Arc;

use futures::{StreamExt, stream::FuturesUnordered};
use gptk_model::MediaItem;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use dhash::{DHash, calculate_hash_size};
pub use grouping::group_similar;
pub use thumbnails::{FileThumbnails, HttpThumbnails, ThumbnailSource, thumbnail_url};

use crate::{
    config::SimilarityConfig,
    error::{Result, ToolkitError},
};

/// Decodes an encoded image and hashes it at `hash_size`.
pub fn hash_bytes(bytes: &[u8], hash_size: u32) -> Result<DHash> {
    let image = image::load_from_memory(bytes)?;
    Ok(DHash::compute(&image, hash_size))
}

/// [`hash_bytes`] on the blocking pool, keeping decode work off the async
/// worker threads.
pub async fn hash_bytes_blocking(bytes: Vec<u8>, hash_size: u32) -> Result<DHash> {
    tokio::task::spawn_blocking(move || hash_bytes(&bytes, hash_size))
        .await
        .map_err(|err| ToolkitError::Internal(format!("hash task: {err}")))?
}

/// Groups produced by one pass, plus what fell out along the way.
#[derive(Debug, Clone, Default)]
pub struct SimilarityReport {
    /// Groups of two or more, in the order their first member was seen.
    pub groups: Vec<Vec<MediaItem>>,
    pub hashed: usize,
    pub without_thumbnail: usize,
    pub failed: usize,
}

impl SimilarityReport {
    /// Every grouped item, group by group.
    pub fn into_members(self) -> Vec<MediaItem> {
        self.groups.into_iter().flatten().collect()
    }
}

struct Job {
    index: usize,
    url: String,
}

#[derive(Clone)]
pub struct SimilarityEngine {
    thumbnails: Arc<dyn ThumbnailSource>,
    config: SimilarityConfig,
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SimilarityEngine {
    pub fn new(thumbnails: Arc<dyn ThumbnailSource>, config: SimilarityConfig) -> Self {
        Self { thumbnails, config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Members of every near-duplicate group in `items`.
    pub async fn filter_similar(
        &self,
        items: Vec<MediaItem>,
        threshold: f64,
        image_height: Option<u32>,
        cancel: &CancellationToken,
    ) -> Vec<MediaItem> {
        self.group(items, threshold, image_height, cancel)
            .await
            .into_members()
    }

    pub async fn group(
        &self,
        items: Vec<MediaItem>,
        threshold: f64,
        image_height: Option<u32>,
        cancel: &CancellationToken,
    ) -> SimilarityReport {
        let height = image_height.unwrap_or(self.config.default_image_height);
        let hash_size = calculate_hash_size(height);

        let (tx, rx) = mpsc::unbounded_channel();
        let mut without_thumbnail = 0usize;
        for (index, item) in items.iter().enumerate() {
            match item.thumb.as_deref().filter(|thumb| !thumb.is_empty()) {
                Some(thumb) => {
                    let _ = tx.send(Job {
                        index,
                        url: thumbnail_url(thumb, height),
                    });
                }
                None => without_thumbnail += 1,
            }
        }
        drop(tx);
        let candidates = items.len() - without_thumbnail;
        if without_thumbnail > 0 {
            info!(without_thumbnail, "Skipping items without a thumbnail");
        }

        let queue = Mutex::new(rx);
        let workers = self.config.workers.clamp(1, candidates.max(1));
        debug!(candidates, workers, hash_size, height, "Hashing thumbnails");

        let mut pool: FuturesUnordered<_> = (0..workers)
            .map(|worker| self.worker(worker, &queue, hash_size, cancel))
            .collect();
        let mut hashed = Vec::with_capacity(candidates);
        let mut failed = 0usize;
        while let Some((done, misses)) = pool.next().await {
            hashed.extend(done);
            failed += misses;
        }

        if cancel.is_cancelled() {
            info!(
                hashed = hashed.len(),
                candidates,
                "Stop requested, grouping skipped"
            );
            return SimilarityReport {
                hashed: hashed.len(),
                without_thumbnail,
                failed,
                ..SimilarityReport::default()
            };
        }

        // Grouping depends on visiting order; use input order rather than
        // download completion order.
        hashed.sort_by_key(|(index, _)| *index);
        let count = hashed.len();
        let groups: Vec<Vec<MediaItem>> = group_similar(hashed, threshold)
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .map(|index| items[index].clone())
                    .collect()
            })
            .collect();

        info!(
            hashed = count,
            groups = groups.len(),
            grouped = groups.iter().map(Vec::len).sum::<usize>(),
            failed,
            "Similarity grouping finished"
        );
        SimilarityReport {
            groups,
            hashed: count,
            without_thumbnail,
            failed,
        }
    }

    async fn worker(
        &self,
        worker: usize,
        queue: &Mutex<mpsc::UnboundedReceiver<Job>>,
        hash_size: u32,
        cancel: &CancellationToken,
    ) -> (Vec<(usize, DHash)>, usize) {
        let mut done = Vec::new();
        let mut failed = 0usize;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            let next = queue.lock().await.recv().await;
            let Some(job) = next else {
                break;
            };

            let Some(bytes) = self.fetch_with_retry(&job.url, cancel).await else {
                if !cancel.is_cancelled() {
                    failed += 1;
                }
                continue;
            };
            if cancel.is_cancelled() {
                break;
            }

            match hash_bytes_blocking(bytes, hash_size).await {
                Ok(hash) => done.push((job.index, hash)),
                Err(err) => {
                    warn!(index = job.index, error = %err, "Could not hash thumbnail");
                    failed += 1;
                }
            }
        }

        debug!(
            worker,
            hashed = done.len(),
            failed,
            "Thumbnail worker finished"
        );
        (done, failed)
    }

    async fn fetch_with_retry(&self, url: &str, cancel: &CancellationToken) -> Option<Vec<u8>> {
        let attempts = self.config.max_attempts.max(1);
        for attempt in 1..=attempts {
            if cancel.is_cancelled() {
                return None;
            }
            let fetch = self.thumbnails.fetch(url);
            match tokio::time::timeout(self.config.fetch_timeout(), fetch).await {
                Ok(Ok(bytes)) => return Some(bytes),
                Ok(Err(err)) => warn!(url, attempt, error = %err, "Thumbnail fetch failed"),
                Err(_) => warn!(url, attempt, "Thumbnail fetch timed out"),
            }
            if attempt < attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(self.config.retry_backoff(attempt)) => {}
                }
            }
        }
        warn!(url, attempts, "Giving up on thumbnail");
        None
    }
}
