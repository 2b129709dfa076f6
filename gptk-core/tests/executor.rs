use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use gptk_core::{ConcurrencyLimits, ToolkitError, batch::BatchExecutor};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Tracker {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Tracker {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn limits(single: usize, batch: usize) -> ConcurrencyLimits {
    ConcurrencyLimits { single, batch }
}

#[tokio::test]
async fn thousand_items_in_four_chunks_three_at_a_time() {
    let executor = BatchExecutor::new(limits(30, 3), CancellationToken::new());
    let tracker = Arc::new(Tracker::default());
    let items: Vec<u32> = (0..1_000).collect();

    let results = executor
        .execute("tracked_op", 250, items.clone(), |chunk| {
            let tracker = tracker.clone();
            async move {
                tracker.enter();
                tokio::time::sleep(Duration::from_millis(20)).await;
                tracker.leave();
                Ok(Some(chunk))
            }
        })
        .await;

    assert_eq!(tracker.calls.load(Ordering::SeqCst), 4);
    assert!(tracker.peak.load(Ordering::SeqCst) <= 3);
    assert_eq!(tracker.peak.load(Ordering::SeqCst), 3);

    let returned: HashSet<u32> = results.into_iter().collect();
    assert_eq!(returned, items.into_iter().collect());
}

#[tokio::test]
async fn failed_and_empty_chunks_contribute_nothing() {
    let executor = BatchExecutor::new(limits(30, 3), CancellationToken::new());
    let items: Vec<u32> = (0..10).collect();

    let results = executor
        .execute("flaky", 2, items, |chunk| async move {
            match chunk[0] {
                2 => Err(ToolkitError::remote("flaky", "boom")),
                6 => Ok(None),
                _ => Ok(Some(chunk)),
            }
        })
        .await;

    let mut results = results;
    results.sort_unstable();
    assert_eq!(results, vec![0, 1, 4, 5, 8, 9]);
}

#[tokio::test]
async fn single_item_chunks_use_the_single_ceiling() {
    let executor = BatchExecutor::new(limits(5, 1), CancellationToken::new());
    let tracker = Arc::new(Tracker::default());

    let results = executor
        .execute("single", 1, (0..20).collect::<Vec<u32>>(), |chunk| {
            let tracker = tracker.clone();
            async move {
                tracker.enter();
                tokio::time::sleep(Duration::from_millis(5)).await;
                tracker.leave();
                Ok(Some(chunk))
            }
        })
        .await;

    assert_eq!(results.len(), 20);
    assert_eq!(tracker.peak.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn cancellation_stops_scheduling_but_keeps_finished_chunks() {
    let cancel = CancellationToken::new();
    let executor = BatchExecutor::new(limits(1, 1), cancel.clone());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let results = executor
        .execute("cancel", 1, (0..10).collect::<Vec<u32>>(), |chunk| {
            let seen = seen.clone();
            let cancel = cancel.clone();
            async move {
                seen.lock().unwrap().push(chunk[0]);
                if chunk[0] == 2 {
                    cancel.cancel();
                }
                Ok(Some(chunk))
            }
        })
        .await;

    // The chunk that raised the stop still completes; nothing after it starts.
    assert_eq!(results, vec![0, 1, 2]);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
}
