//! Chunked execution of remote operations under an in-flight ceiling.

use std::future::Future;

use futures::{StreamExt, stream::FuturesUnordered};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{config::ConcurrencyLimits, error::Result};

/// Splits `items` into consecutive chunks of `size` (at least 1). Only the
/// last chunk may be short.
pub fn split_into_chunks<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

/// Runs one operation per chunk with at most the applicable ceiling in
/// flight.
///
/// A chunk that fails, or that the service answers with nothing usable, is
/// logged and contributes nothing; the remaining chunks still run. Once the
/// run is cancelled no further chunks are launched, while chunks already in
/// flight are awaited and keep their results.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    limits: ConcurrencyLimits,
    cancel: CancellationToken,
}

impl BatchExecutor {
    pub fn new(limits: ConcurrencyLimits, cancel: CancellationToken) -> Self {
        Self { limits, cancel }
    }

    pub fn limits(&self) -> ConcurrencyLimits {
        self.limits
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Results come back in completion order.
    pub async fn execute<I, O, F, Fut>(
        &self,
        operation: &str,
        chunk_size: usize,
        items: Vec<I>,
        op: F,
    ) -> Vec<O>
    where
        F: Fn(Vec<I>) -> Fut,
        Fut: Future<Output = Result<Option<Vec<O>>>>,
    {
        let chunk_size = chunk_size.max(1);
        let ceiling = self.limits.for_chunk_size(chunk_size).max(1);
        let chunks = split_into_chunks(items, chunk_size);
        let total = chunks.len();
        debug!(
            operation,
            chunks = total,
            chunk_size,
            ceiling,
            "Executing chunked operation"
        );

        let mut pending = chunks.into_iter().enumerate();
        let mut in_flight = FuturesUnordered::new();
        let mut results = Vec::new();
        let mut failed = 0usize;
        let mut stopped = false;

        loop {
            while !stopped && in_flight.len() < ceiling {
                if self.cancel.is_cancelled() {
                    info!(
                        operation,
                        launched = total - pending.len(),
                        chunks = total,
                        "Stop requested, no further chunks scheduled"
                    );
                    stopped = true;
                    break;
                }
                let Some((index, chunk)) = pending.next() else {
                    break;
                };
                let call = op(chunk);
                in_flight.push(async move { (index, call.await) });
            }

            let Some((index, outcome)) = in_flight.next().await else {
                break;
            };
            match outcome {
                Ok(Some(output)) => {
                    debug!(
                        operation,
                        chunk = index,
                        results = output.len(),
                        "Chunk finished"
                    );
                    results.extend(output);
                }
                Ok(None) => {
                    failed += 1;
                    warn!(operation, chunk = index, "Chunk returned no usable result");
                }
                Err(err) => {
                    failed += 1;
                    error!(operation, chunk = index, error = %err, "Chunk failed");
                }
            }
        }

        info!(
            operation,
            chunks = total,
            failed,
            results = results.len(),
            "Chunked operation finished"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_rebuild_the_input() {
        let items: Vec<u32> = (0..23).collect();
        let chunks = split_into_chunks(items.clone(), 5);
        assert_eq!(chunks.len(), 5);
        assert!(chunks[..4].iter().all(|chunk| chunk.len() == 5));
        assert_eq!(chunks[4].len(), 3);
        assert_eq!(chunks.concat(), items);
    }

    #[test]
    fn zero_chunk_size_is_treated_as_one() {
        let chunks = split_into_chunks(vec!['a', 'b'], 0);
        assert_eq!(chunks, vec![vec!['a'], vec!['b']]);
        assert!(split_into_chunks(Vec::<u8>::new(), 3).is_empty());
    }
}
