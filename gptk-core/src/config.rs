use std::time::Duration;

use gptk_model::ALBUM_ITEM_LIMIT;
use serde::{Deserialize, Serialize};

/// Global knobs that tune how hard a run leans on the remote service.
///
/// All fields carry defaults so a config file only needs the values it wants
/// to change.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// In-flight ceiling for per-item operations (chunk size 1), such as
    /// description writes.
    pub max_concurrent_single_api_reqs: usize,
    /// In-flight ceiling for bulk operations.
    pub max_concurrent_batch_api_reqs: usize,
    /// Items per mutating call (trash, archive, favorite, album add).
    pub operation_size: usize,
    /// Items per lock/unlock call. The locked folder endpoint rejects large
    /// batches more readily than the others.
    pub locked_folder_operation_size: usize,
    /// Items per bulk info lookup.
    pub info_size: usize,
    /// Per-album item ceiling used when splitting album adds.
    pub album_capacity: usize,
    pub similarity: SimilarityConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            max_concurrent_single_api_reqs: 30,
            max_concurrent_batch_api_reqs: 3,
            operation_size: 250,
            locked_folder_operation_size: 100,
            info_size: 5_000,
            album_capacity: ALBUM_ITEM_LIMIT,
            similarity: SimilarityConfig::default(),
        }
    }
}

impl ToolkitConfig {
    pub fn concurrency_limits(&self) -> ConcurrencyLimits {
        ConcurrencyLimits {
            single: self.max_concurrent_single_api_reqs.max(1),
            batch: self.max_concurrent_batch_api_reqs.max(1),
        }
    }
}

/// The two in-flight ceilings of the batch executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencyLimits {
    pub single: usize,
    pub batch: usize,
}

impl ConcurrencyLimits {
    /// Ceiling that applies to operations over chunks of `chunk_size`.
    pub fn for_chunk_size(&self, chunk_size: usize) -> usize {
        if chunk_size <= 1 { self.single } else { self.batch }
    }
}

impl Default for ConcurrencyLimits {
    fn default() -> Self {
        ToolkitConfig::default().concurrency_limits()
    }
}

/// Thumbnail download and hashing settings for near-duplicate grouping.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Thumbnail download workers.
    pub workers: usize,
    pub max_attempts: u32,
    /// Linear backoff step: attempt `n` waits `n * retry_backoff_ms` before
    /// retrying.
    pub retry_backoff_ms: u64,
    /// Timeout for a single download attempt.
    pub fetch_timeout_ms: u64,
    /// Thumbnail height used when the filter does not name one.
    pub default_image_height: u32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            max_attempts: 3,
            retry_backoff_ms: 1_000,
            fetch_timeout_ms: 10_000,
            default_image_height: 1_024,
        }
    }
}

impl SimilarityConfig {
    pub fn retry_backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(attempt as u64))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_item_chunks_use_the_single_ceiling() {
        let limits = ConcurrencyLimits {
            single: 30,
            batch: 3,
        };
        assert_eq!(limits.for_chunk_size(1), 30);
        assert_eq!(limits.for_chunk_size(0), 30);
        assert_eq!(limits.for_chunk_size(250), 3);
    }

    #[test]
    fn backoff_grows_linearly() {
        let config = SimilarityConfig::default();
        assert_eq!(config.retry_backoff(1), Duration::from_secs(1));
        assert_eq!(config.retry_backoff(3), Duration::from_secs(3));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let parsed: ToolkitConfig =
            serde_json::from_str(r#"{"operation_size": 50}"#).unwrap();
        assert_eq!(parsed.operation_size, 50);
        assert_eq!(parsed.info_size, 5_000);
        assert_eq!(parsed.similarity.max_attempts, 3);
    }
}
