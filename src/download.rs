//! Download
//!
//! Client-side save-as boundary. The browser mechanics (object URL
//! creation, anchor clicking, revocation) live behind traits; the crate
//! guarantees that a created object URL is revoked on every path, including
//! failure downstream of its creation, via an RAII guard.

use thiserror::Error;

/// Error raised when a document cannot be saved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to save {filename}: {reason}")]
pub struct SaveError {
    /// Target filename.
    pub filename: String,

    /// Failure description.
    pub reason: String,
}

/// Triggers a client-side save-as download for binary bytes.
pub trait FileSaver {
    /// Saves the bytes under the given filename.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveError`] when the save cannot be triggered.
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), SaveError>;
}

/// Browser surface backing an object-URL download: URL lifecycle plus the
/// anchor-click trigger.
pub trait DownloadSurface {
    /// Creates an object URL for the bytes.
    fn create_url(&self, bytes: &[u8]) -> String;

    /// Triggers the save-as download of the URL.
    ///
    /// # Errors
    ///
    /// Returns a [`SaveError`] when the click cannot be dispatched.
    fn click(&self, url: &str, filename: &str) -> Result<(), SaveError>;

    /// Revokes a previously created object URL.
    fn revoke_url(&self, url: &str);
}

/// Revokes the held object URL when dropped.
#[derive(Debug)]
pub struct ObjectUrlGuard<'a, S: DownloadSurface> {
    surface: &'a S,
    url: String,
}

impl<'a, S: DownloadSurface> ObjectUrlGuard<'a, S> {
    /// Creates an object URL for the bytes, guarded for revocation.
    #[must_use]
    pub fn create(surface: &'a S, bytes: &[u8]) -> Self {
        ObjectUrlGuard {
            url: surface.create_url(bytes),
            surface,
        }
    }

    /// The guarded URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<S: DownloadSurface> Drop for ObjectUrlGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.revoke_url(&self.url);
    }
}

/// File saver built on an object-URL download surface.
#[derive(Debug)]
pub struct ObjectUrlSaver<S: DownloadSurface> {
    surface: S,
}

impl<S: DownloadSurface> ObjectUrlSaver<S> {
    /// Creates a saver over the given surface.
    #[must_use]
    pub fn new(surface: S) -> Self {
        ObjectUrlSaver { surface }
    }
}

impl<S: DownloadSurface> FileSaver for ObjectUrlSaver<S> {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), SaveError> {
        let guard = ObjectUrlGuard::create(&self.surface, bytes);

        self.surface.click(guard.url(), filename)
        // Guard drops here, revoking the URL whether the click succeeded
        // or not.
    }
}

/// Saver writing documents into a directory, for native use and tests.
#[derive(Debug)]
pub struct DirFileSaver {
    dir: std::path::PathBuf,
}

impl DirFileSaver {
    /// Creates a saver targeting the given directory.
    #[must_use]
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        DirFileSaver { dir: dir.into() }
    }
}

impl FileSaver for DirFileSaver {
    fn save(&self, bytes: &[u8], filename: &str) -> Result<(), SaveError> {
        std::fs::write(self.dir.join(filename), bytes).map_err(|err| SaveError {
            filename: filename.to_string(),
            reason: err.to_string(),
        })
    }
}
