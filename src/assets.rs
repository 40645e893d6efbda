//! Assets
//!
//! Boundary for resolving remote image URLs into embeddable byte content.
//! The actual network transport lives outside the crate; composition only
//! depends on the [`AssetFetcher`] trait.

use std::collections::BTreeMap;

use thiserror::Error;

/// Error raised when a remote asset cannot be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch asset {url}: {reason}")]
pub struct AssetFetchError {
    /// The URL that failed to resolve.
    pub url: String,

    /// Transport-level failure description.
    pub reason: String,
}

/// A resolved asset ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// MIME type, e.g. `image/png`.
    pub mime: String,

    /// Raw asset bytes.
    pub bytes: Vec<u8>,
}

/// Resolves a remote URL to embeddable byte content.
pub trait AssetFetcher {
    /// Fetches the asset behind `url`.
    ///
    /// # Errors
    ///
    /// Returns an [`AssetFetchError`] on network failure; there is no
    /// fallback asset.
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetFetchError>;
}

/// In-memory fetcher backed by a fixed URL -> asset map. Used in tests and
/// anywhere assets are known ahead of time.
#[derive(Debug, Default)]
pub struct StaticAssets {
    assets: BTreeMap<String, FetchedAsset>,
}

impl StaticAssets {
    /// Creates an empty fetcher that fails every lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an asset under the given URL.
    pub fn insert(&mut self, url: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(
            url.into(),
            FetchedAsset {
                mime: mime.into(),
                bytes,
            },
        );
    }
}

impl AssetFetcher for StaticAssets {
    async fn fetch(&self, url: &str) -> Result<FetchedAsset, AssetFetchError> {
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| AssetFetchError {
                url: url.to_string(),
                reason: "unknown asset".to_string(),
            })
    }
}
