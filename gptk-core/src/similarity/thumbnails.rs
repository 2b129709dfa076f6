//! Thumbnail downloads.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, ToolkitError};

/// Where thumbnail bytes come from.
#[async_trait]
pub trait ThumbnailSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Thumbnail base URL sized to `height` pixels.
pub fn thumbnail_url(base: &str, height: u32) -> String {
    format!("{base}=h{height}")
}

#[derive(Debug, Clone)]
pub struct HttpThumbnails {
    client: reqwest::Client,
}

impl HttpThumbnails {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gptk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ThumbnailSource for HttpThumbnails {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Downloading thumbnail");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Reads thumbnails from disk, treating the URL's base as a path. Serves
/// offline runs whose snapshots point at locally saved images.
#[derive(Debug, Clone, Default)]
pub struct FileThumbnails {
    root: Option<PathBuf>,
}

impl FileThumbnails {
    /// Relative paths resolve against `root` when one is given.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ThumbnailSource for FileThumbnails {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let base = url.rsplit_once("=h").map_or(url, |(base, _)| base);
        let base = base.strip_prefix("file://").unwrap_or(base);
        let path = match &self.root {
            Some(root) => root.join(base),
            None => PathBuf::from(base),
        };
        tokio::fs::read(&path).await.map_err(|err| {
            ToolkitError::NotFound(format!("thumbnail {}: {err}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_the_height_suffix() {
        assert_eq!(
            thumbnail_url("https://lh3.example.com/abc", 512),
            "https://lh3.example.com/abc=h512"
        );
    }

    #[tokio::test]
    async fn file_thumbnails_strip_the_size_suffix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.png"), b"png").unwrap();

        let source = FileThumbnails::new(Some(dir.path().to_path_buf()));
        let bytes = source.fetch(&thumbnail_url("one.png", 256)).await.unwrap();
        assert_eq!(bytes, b"png");
        assert!(source.fetch("missing.png=h256").await.is_err());
    }
}
