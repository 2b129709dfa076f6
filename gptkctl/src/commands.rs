use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, bail};
use gptk_core::{
    Action, RunOutcome, RunRequest, Toolkit,
    api::memory::{InMemoryPhotosApi, LibrarySnapshot},
    filters,
    similarity::{DHash, FileThumbnails, calculate_hash_size, group_similar, hash_bytes_blocking},
};
use gptk_model::Source;
use tracing::{info, warn};

use crate::settings;

#[derive(Debug)]
pub struct RunInput {
    pub snapshot: PathBuf,
    pub source: Source,
    pub filter: Option<PathBuf>,
    pub action: Option<Action>,
    pub config: Option<PathBuf>,
    pub write_back: bool,
}

/// Runs against the snapshot and prints the report as JSON on stdout.
/// Thumbnail references in the snapshot resolve relative to its directory.
pub async fn run(input: RunInput) -> anyhow::Result<()> {
    let (config, origin) = settings::load_config(input.config.as_deref())?;
    info!(config = %origin, "Toolkit config loaded");
    let filter = settings::load_filter(input.filter.as_deref())?;

    let shown = input.snapshot.display();
    let snapshot = LibrarySnapshot::load(&input.snapshot)
        .with_context(|| format!("failed to load snapshot {shown}"))?;
    let api = Arc::new(InMemoryPhotosApi::new(snapshot));
    let thumbnails = Arc::new(FileThumbnails::new(
        input.snapshot.parent().map(Path::to_path_buf),
    ));
    let toolkit = Toolkit::new(api.clone(), thumbnails, config);

    let stop = toolkit.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after in-flight work");
            stop.cancel();
        }
    });

    let request = RunRequest {
        source: input.source,
        filter,
        action: input.action,
    };
    let result = toolkit.run(request).await;
    interrupt.abort();
    let report = result.context("run rejected")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if input.write_back {
        api.snapshot()?
            .save(&input.snapshot)
            .with_context(|| format!("failed to write snapshot {shown}"))?;
        info!(path = %shown, "Snapshot written back");
    }

    if let RunOutcome::Failed(reason) = &report.outcome {
        bail!("run failed: {reason}");
    }
    Ok(())
}

pub fn validate(
    filter_path: &Path,
    source: &Source,
    action: Option<&Action>,
) -> anyhow::Result<()> {
    let filter = settings::load_filter(Some(filter_path))?;
    filters::validate(source, &filter, action)
        .with_context(|| format!("{} rejected", filter_path.display()))?;
    println!("{} is valid for the {source} source", filter_path.display());
    Ok(())
}

pub async fn hash(images: &[PathBuf], height: u32) -> anyhow::Result<()> {
    let size = calculate_hash_size(height);
    for path in images {
        let hash = hash_file(path, size).await?;
        println!("{hash}  {}", path.display());
    }
    Ok(())
}

/// Prints groups of alike images as a JSON array of path arrays. Files that
/// cannot be read or decoded are skipped with a warning.
pub async fn similar(images: &[PathBuf], threshold: f64, height: u32) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("threshold {threshold} is outside 0.0..=1.0");
    }
    let size = calculate_hash_size(height);

    let mut hashed = Vec::with_capacity(images.len());
    for path in images {
        match hash_file(path, size).await {
            Ok(hash) => hashed.push((path.display().to_string(), hash)),
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping image"),
        }
    }

    let groups = group_similar(hashed, threshold);
    info!(groups = groups.len(), "Grouping complete");
    println!("{}", serde_json::to_string_pretty(&groups)?);
    Ok(())
}

async fn hash_file(path: &Path, size: u32) -> anyhow::Result<DHash> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    hash_bytes_blocking(bytes, size)
        .await
        .with_context(|| format!("failed to hash {}", path.display()))
}
