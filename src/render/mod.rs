//! Rendering backends
//!
//! The original widget grew several near-duplicate PDF glue modules. Here
//! the responsibility is a single capability: a [`DocumentBackend`] turns a
//! [`PrintableDocument`] into binary document bytes. Implementations are
//! swappable and selected by configuration.

use serde::Deserialize;
use thiserror::Error;

use crate::document::PrintableDocument;

pub mod content_tree;
pub mod draw_calls;
pub mod text;

/// Error raised by an external rendering engine.
#[derive(Debug, Error)]
#[error("rendering engine failed: {0}")]
pub struct EngineError(pub String);

/// Errors that can occur while rendering a document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The external rendering engine is not present at call time.
    #[error("document rendering backend is not available")]
    BackendUnavailable,

    /// The engine accepted the document but failed to produce bytes.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Which document backend renders the order document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Hand the document to an engine as a structured content tree.
    #[default]
    ContentTree,

    /// Lower the document to primitive draw instructions.
    DrawCalls,

    /// Render the document as plain text, no external engine.
    Text,
}

/// Turns a printable document into binary document bytes.
pub trait DocumentBackend {
    /// Renders the document.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BackendUnavailable`] when the external engine
    /// is absent, and [`RenderError::Engine`] when it fails. Errors are
    /// propagated, never retried.
    async fn render(&self, document: &PrintableDocument) -> Result<Vec<u8>, RenderError>;
}
