//! Submission
//!
//! Orchestrates one order submission: the raw form snapshot is normalised
//! once into a frozen [`OrderSummary`], then fanned out to document
//! generation (compose, render, save) and notification dispatch. Document
//! failures degrade gracefully; dispatch still proceeds with the structured
//! payload alone. Normaliser errors abort the submission with no partial
//! outcome.

use thiserror::Error;

use crate::{
    assets::AssetFetcher,
    config::WidgetConfig,
    delivery::{DispatchReport, Dispatcher, Mailer},
    document::{ComposeError, Composer},
    download::{FileSaver, SaveError},
    order::{OrderForm, OrderFormError, OrderSummary, normalize},
    render::{DocumentBackend, RenderError},
};

/// Errors that prevent a document from being generated. Isolated per
/// submission; they never prevent notification dispatch.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Composition failed (asset fetch or configuration).
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The rendering backend failed or is unavailable.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The rendered bytes could not be saved.
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// A successfully rendered and saved order document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Filename the document was saved under.
    pub filename: String,

    /// Rendered document bytes.
    pub bytes: Vec<u8>,
}

/// Result of one accepted submission.
#[derive(Debug)]
pub struct SubmissionOutcome {
    /// The frozen order summary the fan-out worked from.
    pub summary: OrderSummary,

    /// Document generation result; an error here is the
    /// failed-to-generate-document state surfaced to the user.
    pub document: Result<RenderedDocument, DocumentError>,

    /// Per-channel notification outcomes.
    pub dispatch: DispatchReport,
}

/// One-shot submission pipeline wiring configuration to the external
/// collaborators.
#[derive(Debug)]
pub struct Submission<'a, F, B, M, S>
where
    F: AssetFetcher,
    B: DocumentBackend,
    M: Mailer,
    S: FileSaver,
{
    config: &'a WidgetConfig,
    fetcher: &'a F,
    backend: &'a B,
    mailer: &'a M,
    saver: &'a S,
}

impl<'a, F, B, M, S> Submission<'a, F, B, M, S>
where
    F: AssetFetcher,
    B: DocumentBackend,
    M: Mailer,
    S: FileSaver,
{
    /// Creates a pipeline over the given configuration and collaborators.
    #[must_use]
    pub fn new(
        config: &'a WidgetConfig,
        fetcher: &'a F,
        backend: &'a B,
        mailer: &'a M,
        saver: &'a S,
    ) -> Self {
        Submission {
            config,
            fetcher,
            backend,
            mailer,
            saver,
        }
    }

    /// Runs one submission from a raw form JSON snapshot.
    ///
    /// The summary is computed once before any I/O; in-flight cart edits
    /// cannot be observed by the fan-out. A submission in flight runs to
    /// completion; there is no cancellation and no automatic retry.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderFormError`] when the snapshot is malformed. No
    /// partial outcome is produced in that case.
    pub async fn submit_json(&self, raw_form: &str) -> Result<SubmissionOutcome, OrderFormError> {
        let form = OrderForm::from_json(raw_form)?;

        Ok(self.submit(&form).await)
    }

    /// Runs one submission from an already-parsed form.
    pub async fn submit(&self, form: &OrderForm) -> SubmissionOutcome {
        let summary = normalize(form);

        let document = self.produce_document(&summary).await;

        if let Err(err) = &document {
            tracing::error!(error = %err, "failed to generate order document");
        }

        let rendered = document.as_ref().ok().map(|doc| doc.bytes.as_slice());
        let dispatch = Dispatcher::new(&self.config.delivery, self.mailer)
            .dispatch(&summary, rendered)
            .await;

        SubmissionOutcome {
            summary,
            document,
            dispatch,
        }
    }

    async fn produce_document(
        &self,
        summary: &OrderSummary,
    ) -> Result<RenderedDocument, DocumentError> {
        let composer = Composer::new(&self.config.branding, self.fetcher);
        let document = composer.compose(summary).await?;

        let bytes = self.backend.render(&document).await?;

        self.saver.save(&bytes, &self.config.download_filename)?;

        Ok(RenderedDocument {
            filename: self.config.download_filename.clone(),
            bytes,
        })
    }
}
