mod common;

use std::{sync::Arc, time::Duration};

use common::{SyntheticThumbnails, gradient_png, keys};
use gptk_core::{
    SimilarityConfig,
    similarity::{DHash, SimilarityEngine, calculate_hash_size, hash_bytes, hash_bytes_blocking},
};
use gptk_model::MediaItem;
use tokio_util::sync::CancellationToken;

fn thumbed(key: &str, thumb: Option<&str>) -> MediaItem {
    let mut item = MediaItem::new(key, key);
    item.thumb = thumb.map(str::to_string);
    item
}

fn fast_config() -> SimilarityConfig {
    SimilarityConfig {
        workers: 3,
        max_attempts: 3,
        retry_backoff_ms: 5,
        fetch_timeout_ms: 200,
        default_image_height: 256,
    }
}

#[tokio::test]
async fn near_duplicates_group_and_the_rest_drop_out() {
    let thumbnails = SyntheticThumbnails::with(vec![
        ("thumb/a", gradient_png(true, 0)),
        ("thumb/b", gradient_png(false, 0)),
        ("thumb/c", gradient_png(true, 3)),
    ]);
    let engine = SimilarityEngine::new(Arc::new(thumbnails), fast_config());
    let items = vec![
        thumbed("a", Some("thumb/a")),
        thumbed("b", Some("thumb/b")),
        thumbed("c", Some("thumb/c")),
        thumbed("no-thumb", None),
    ];

    let cancel = CancellationToken::new();
    let report = engine.group(items, 0.9, None, &cancel).await;

    assert_eq!(report.without_thumbnail, 1);
    assert_eq!(report.hashed, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(keys(&report.groups[0]), ["a", "c"]);
}

#[tokio::test]
async fn thumbnails_are_requested_at_the_filter_height() {
    let thumbnails = SyntheticThumbnails::with(vec![("thumb/a", gradient_png(true, 0))]);
    let thumbnails = Arc::new(thumbnails);
    let engine = SimilarityEngine::new(thumbnails.clone(), fast_config());
    let items = vec![thumbed("a", Some("thumb/a"))];

    let cancel = CancellationToken::new();
    engine.group(items, 0.9, Some(640), &cancel).await;

    assert_eq!(thumbnails.requests(), ["thumb/a=h640"]);
}

#[tokio::test]
async fn flaky_downloads_are_retried() {
    let thumbnails = Arc::new(
        SyntheticThumbnails::with(vec![
            ("thumb/a", gradient_png(true, 0)),
            ("thumb/b", gradient_png(true, 0)),
        ])
        .failing("thumb/b", 2),
    );
    let engine = SimilarityEngine::new(thumbnails.clone(), fast_config());

    let members = engine
        .filter_similar(
            vec![thumbed("a", Some("thumb/a")), thumbed("b", Some("thumb/b"))],
            0.95,
            None,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(keys(&members), ["a", "b"]);
    let attempts_for_b = thumbnails
        .requests()
        .iter()
        .filter(|url| url.starts_with("thumb/b"))
        .count();
    assert_eq!(attempts_for_b, 3);
}

#[tokio::test]
async fn exhausted_retries_drop_the_item() {
    let thumbnails = SyntheticThumbnails::with(vec![
        ("thumb/a", gradient_png(true, 0)),
        ("thumb/b", gradient_png(true, 0)),
    ])
    .failing("thumb/b", 5);
    let engine = SimilarityEngine::new(Arc::new(thumbnails), fast_config());

    let report = engine
        .group(
            vec![thumbed("a", Some("thumb/a")), thumbed("b", Some("thumb/b"))],
            0.9,
            None,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.failed, 1);
    assert!(report.groups.is_empty());
}

#[tokio::test]
async fn slow_downloads_time_out() {
    let thumbnails = SyntheticThumbnails {
        delay: Some(Duration::from_millis(500)),
        ..SyntheticThumbnails::with(vec![("thumb/a", gradient_png(true, 0))])
    };
    let config = SimilarityConfig {
        max_attempts: 1,
        fetch_timeout_ms: 20,
        ..fast_config()
    };
    let engine = SimilarityEngine::new(Arc::new(thumbnails), config);

    let items = vec![thumbed("a", Some("thumb/a"))];
    let cancel = CancellationToken::new();
    let report = engine.group(items, 0.9, None, &cancel).await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.hashed, 0);
}

#[tokio::test]
async fn cancelled_pass_groups_nothing() {
    let thumbnails = SyntheticThumbnails::with(vec![
        ("thumb/a", gradient_png(true, 0)),
        ("thumb/b", gradient_png(true, 0)),
    ]);
    let engine = SimilarityEngine::new(Arc::new(thumbnails), fast_config());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = engine
        .group(
            vec![thumbed("a", Some("thumb/a")), thumbed("b", Some("thumb/b"))],
            0.9,
            None,
            &cancel,
        )
        .await;

    assert!(report.groups.is_empty());
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn stop_during_retry_backoff_returns_promptly() {
    let thumbnails = SyntheticThumbnails::with(vec![("thumb/a", gradient_png(true, 0))])
        .failing("thumb/a", 1);
    let config = SimilarityConfig {
        retry_backoff_ms: 600_000,
        ..fast_config()
    };
    let engine = SimilarityEngine::new(Arc::new(thumbnails), config);
    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stopper.cancel();
    });

    let pass = engine.group(vec![thumbed("a", Some("thumb/a"))], 0.9, None, &cancel);
    let report = tokio::time::timeout(Duration::from_secs(5), pass)
        .await
        .expect("backoff should end on stop");

    assert_eq!(report.hashed, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn blocking_hash_matches_inline_hash() {
    let png = gradient_png(false, 1);
    let inline = hash_bytes(&png, 8).unwrap();
    assert_eq!(hash_bytes_blocking(png, 8).await.unwrap(), inline);
    let garbage = b"not an image".to_vec();
    assert!(hash_bytes_blocking(garbage, 8).await.is_err());
}

#[test]
fn decoded_png_hashes_at_the_derived_size() {
    let size = calculate_hash_size(4_096);
    let hash: DHash = hash_bytes(&gradient_png(true, 0), size).unwrap();
    assert_eq!(hash.size(), 16);
    assert_eq!(hash.bit_len(), 256);
    assert!(hash_bytes(b"not an image", 8).is_err());
}
