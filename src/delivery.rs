//! Delivery
//!
//! Formats the outbound notification payloads for a submitted order and
//! hands them to the external transactional email service. The two channels
//! are independent and non-transactional: a failed channel is logged and
//! recorded, never rolled back, and never fails the submission.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::order::{OrderSummary, OrderVariantLine};

/// Transport-level failure reported by the external email service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("email transport failed: {0}")]
pub struct TransportError(pub String);

/// Delivery identities, passed in explicitly at construction time.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Email service account identifier.
    pub service_id: String,

    /// Template used for the owner notification.
    pub owner_template_id: String,

    /// Template used for the customer acknowledgment; the channel is
    /// skipped entirely when absent.
    #[serde(default)]
    pub customer_template_id: Option<String>,

    /// Public API key authorising the send.
    pub public_key: String,

    /// Fixed destination of the owner notification.
    pub owner_email: String,
}

/// PDF attachment riding along with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    /// Attachment filename.
    pub filename: String,

    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

/// One send request against the external email service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    /// Email service account identifier.
    pub service_id: String,

    /// Template to instantiate.
    pub template_id: String,

    /// Flat key/value payload for the template.
    pub template_variables: BTreeMap<String, String>,

    /// Public API key authorising the send.
    pub auth_key: String,

    /// Optional rendered document attachment.
    pub attachment: Option<EmailAttachment>,
}

/// External email delivery service.
pub trait Mailer {
    /// Performs one remote send.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on transport failure. There is no
    /// delivery confirmation beyond the call succeeding.
    async fn send(&self, request: &EmailRequest) -> Result<(), TransportError>;
}

/// Outcome of one notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The send call succeeded.
    Sent,

    /// The channel is not configured and was skipped.
    Skipped,

    /// The send call failed; the error was logged and swallowed.
    Failed(TransportError),
}

impl ChannelOutcome {
    /// Whether the channel's send call succeeded.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, ChannelOutcome::Sent)
    }
}

/// Per-channel outcomes of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Owner notification outcome.
    pub owner: ChannelOutcome,

    /// Customer acknowledgment outcome.
    pub customer: ChannelOutcome,
}

/// Builds and sends the notification payloads for submitted orders.
#[derive(Debug)]
pub struct Dispatcher<'a, M: Mailer> {
    config: &'a DeliveryConfig,
    mailer: &'a M,
}

impl<'a, M: Mailer> Dispatcher<'a, M> {
    /// Creates a dispatcher over the given identities and transport.
    #[must_use]
    pub fn new(config: &'a DeliveryConfig, mailer: &'a M) -> Self {
        Dispatcher { config, mailer }
    }

    /// Dispatches the owner notification and, when configured, the customer
    /// acknowledgment for one order.
    ///
    /// Channels are independent: a failure in one is logged and recorded in
    /// the report without blocking the other. The rendered document bytes
    /// are optional and only attached to the owner notification; the
    /// customer channel never requires them.
    pub async fn dispatch(
        &self,
        summary: &OrderSummary,
        document: Option<&[u8]>,
    ) -> DispatchReport {
        let owner = self
            .send_channel("owner", self.owner_request(summary, document))
            .await;

        let customer = if let Some(request) = self.customer_request(summary) {
            self.send_channel("customer", request).await
        } else {
            ChannelOutcome::Skipped
        };

        DispatchReport { owner, customer }
    }

    async fn send_channel(&self, channel: &'static str, request: EmailRequest) -> ChannelOutcome {
        match self.mailer.send(&request).await {
            Ok(()) => ChannelOutcome::Sent,
            Err(err) => {
                tracing::warn!(channel, error = %err, "order notification failed");

                ChannelOutcome::Failed(err)
            }
        }
    }

    fn owner_request(&self, summary: &OrderSummary, document: Option<&[u8]>) -> EmailRequest {
        let mut variables = BTreeMap::new();
        variables.insert("to_email".to_string(), self.config.owner_email.clone());
        variables.insert("subject".to_string(), "Order".to_string());
        variables.insert(
            "order".to_string(),
            serde_json::to_string(summary).unwrap_or_default(),
        );

        EmailRequest {
            service_id: self.config.service_id.clone(),
            template_id: self.config.owner_template_id.clone(),
            template_variables: variables,
            auth_key: self.config.public_key.clone(),
            attachment: document.map(|bytes| EmailAttachment {
                filename: "document.pdf".to_string(),
                bytes: bytes.to_vec(),
            }),
        }
    }

    fn customer_request(&self, summary: &OrderSummary) -> Option<EmailRequest> {
        let template_id = self.config.customer_template_id.clone()?;

        let mut variables = BTreeMap::new();
        variables.insert("to_email".to_string(), summary.email.clone());
        variables.insert("name".to_string(), summary.name.clone());
        variables.insert("total".to_string(), summary.total_sum.to_string());
        variables.insert("order_lines".to_string(), order_lines_text(summary));

        Some(EmailRequest {
            service_id: self.config.service_id.clone(),
            template_id,
            template_variables: variables,
            auth_key: self.config.public_key.clone(),
            attachment: None,
        })
    }
}

/// Customer-facing plain-text snapshot of the order lines.
#[must_use]
pub fn order_lines_text(summary: &OrderSummary) -> String {
    let mut lines = Vec::new();

    for item in &summary.items {
        lines.push(item.service_name.clone());

        for variant in &item.variants {
            lines.push(variant_line_text(variant));
        }
    }

    lines.join("\n")
}

fn variant_line_text(variant: &OrderVariantLine) -> String {
    format!(
        "  {} x{} = {}",
        variant.name, variant.quantity, variant.total
    )
}
