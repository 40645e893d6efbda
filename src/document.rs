//! Document composition
//!
//! Derives a backend-agnostic [`PrintableDocument`] from a normalised
//! [`OrderSummary`]: a fixed block sequence of background, branding,
//! heading, customer info and the itemised order table. Which engine turns
//! the document into PDF bytes is decided by the rendering backend, not
//! here.

use chrono::NaiveDate;
use rusty_money::iso::Currency;
use serde::Serialize;
use thiserror::Error;

use crate::{
    assets::{AssetFetchError, AssetFetcher},
    config::{BrandingConfig, ConfigError, GradientStop},
    order::OrderSummary,
};

/// Errors that can occur while composing a document.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A remote asset could not be resolved to bytes.
    #[error(transparent)]
    Asset(#[from] AssetFetchError),

    /// The configured currency code is unknown.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Reference to an image used by a document block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// Remote URL, not yet resolved. Never present in a composed document.
    Remote {
        /// Image URL.
        url: String,
    },

    /// Embedded byte content.
    Embedded {
        /// MIME type of the bytes.
        mime: String,

        /// Raw image bytes.
        bytes: Vec<u8>,
    },
}

/// Column header labels of the order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHeader {
    /// Variant column.
    pub variant: String,

    /// Quantity column.
    pub qty: String,

    /// Unit price column.
    pub price: String,

    /// Line total column.
    pub total: String,
}

/// One row of the order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableRow {
    /// Full-width row naming the service the following variant lines
    /// belong to.
    ServiceHeader {
        /// Service name.
        name: String,
    },

    /// One priced variant line. Monetary cells carry the currency suffix.
    VariantLine {
        /// Variant name.
        name: String,

        /// Quantity cell.
        quantity: String,

        /// Unit price cell.
        price: String,

        /// Line total cell.
        total: String,
    },

    /// Trailing grand-total row spanning the first three columns.
    Total {
        /// Total row label.
        label: String,

        /// Grand total cell with currency suffix.
        amount: String,
    },
}

/// One content block of a printable document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Full-bleed vertical gradient band behind the branding header.
    Background {
        /// Gradient stops, top to bottom.
        gradient: Vec<GradientStop>,

        /// Band height in document points.
        height: u32,
    },

    /// Logo plus right-aligned contact text.
    Branding {
        /// Business logo, embedded.
        logo: ImageRef,

        /// Contact lines.
        contact_lines: Vec<String>,
    },

    /// Document heading.
    Heading {
        /// Heading text.
        text: String,
    },

    /// Customer name, email and order date.
    CustomerInfo {
        /// Labelled customer name line.
        name: String,

        /// Labelled customer email line.
        email: String,

        /// Labelled, locale-formatted date line.
        date: String,
    },

    /// Itemised order table.
    Table {
        /// Column header labels.
        header: TableHeader,

        /// Table rows in display order.
        rows: Vec<TableRow>,
    },
}

/// Backend-agnostic description of the order document: an ordered list of
/// content blocks consumed by a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintableDocument {
    /// Content blocks in display order.
    pub blocks: Vec<Block>,
}

/// Composes printable documents from order summaries.
#[derive(Debug)]
pub struct Composer<'a, F: AssetFetcher> {
    branding: &'a BrandingConfig,
    fetcher: &'a F,
}

impl<'a, F: AssetFetcher> Composer<'a, F> {
    /// Creates a composer over the given branding and asset fetcher.
    #[must_use]
    pub fn new(branding: &'a BrandingConfig, fetcher: &'a F) -> Self {
        Composer { branding, fetcher }
    }

    /// Composes a document for the given order, dated today.
    ///
    /// # Errors
    ///
    /// Returns a [`ComposeError`] when the logo cannot be fetched or the
    /// configured currency is unknown.
    pub async fn compose(&self, summary: &OrderSummary) -> Result<PrintableDocument, ComposeError> {
        self.compose_on(summary, chrono::Local::now().date_naive())
            .await
    }

    /// Composes a document for the given order and date.
    ///
    /// The input summary is never mutated; remote image references are
    /// resolved to embedded bytes before the document is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`ComposeError`] when the logo cannot be fetched or the
    /// configured currency is unknown.
    pub async fn compose_on(
        &self,
        summary: &OrderSummary,
        date: NaiveDate,
    ) -> Result<PrintableDocument, ComposeError> {
        let currency = self.branding.currency()?;

        let logo = self.fetcher.fetch(&self.branding.logo_url).await?;

        let blocks = vec![
            Block::Background {
                gradient: self.branding.gradient.clone(),
                height: self.branding.gradient_height,
            },
            Block::Branding {
                logo: ImageRef::Embedded {
                    mime: logo.mime,
                    bytes: logo.bytes,
                },
                contact_lines: self.branding.contact_lines.clone(),
            },
            Block::Heading {
                text: self.branding.heading.clone(),
            },
            Block::CustomerInfo {
                name: format!("{}: {}", self.branding.name_label, summary.name),
                email: format!("{}: {}", self.branding.email_label, summary.email),
                date: format!(
                    "{}: {}",
                    self.branding.date_label,
                    date.format(&self.branding.date_format)
                ),
            },
            Block::Table {
                header: TableHeader {
                    variant: self.branding.labels.variant.clone(),
                    qty: self.branding.labels.qty.clone(),
                    price: self.branding.labels.price.clone(),
                    total: self.branding.labels.total.clone(),
                },
                rows: table_rows(summary, &self.branding.labels.grand_total, currency),
            },
        ];

        Ok(PrintableDocument { blocks })
    }
}

/// Formats a whole-unit amount with the currency symbol suffix.
#[must_use]
pub fn amount_cell(amount: i64, currency: &'static Currency) -> String {
    format!("{amount} {}", currency.symbol)
}

fn table_rows(
    summary: &OrderSummary,
    grand_total_label: &str,
    currency: &'static Currency,
) -> Vec<TableRow> {
    let mut rows = Vec::new();

    for item in &summary.items {
        rows.push(TableRow::ServiceHeader {
            name: item.service_name.clone(),
        });

        for variant in &item.variants {
            rows.push(TableRow::VariantLine {
                name: variant.name.clone(),
                quantity: variant.quantity.to_string(),
                price: amount_cell(variant.price, currency),
                total: amount_cell(variant.total, currency),
            });
        }
    }

    rows.push(TableRow::Total {
        label: grand_total_label.to_string(),
        amount: amount_cell(summary.total_sum, currency),
    });

    rows
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use testresult::TestResult;

    use crate::{
        assets::StaticAssets,
        order::{OrderItem, OrderVariantLine},
    };

    use super::*;

    fn summary() -> OrderSummary {
        OrderSummary {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
            items: vec![
                OrderItem {
                    service_name: "Print".to_string(),
                    variants: vec![
                        OrderVariantLine {
                            name: "A4".to_string(),
                            price: 100,
                            quantity: 2,
                            total: 200,
                        },
                        OrderVariantLine {
                            name: "A3".to_string(),
                            price: 200,
                            quantity: 1,
                            total: 200,
                        },
                    ],
                },
                OrderItem {
                    service_name: "Retouching".to_string(),
                    variants: vec![OrderVariantLine {
                        name: "Retouching".to_string(),
                        price: 500,
                        quantity: 1,
                        total: 500,
                    }],
                },
            ],
            total_sum: 900,
        }
    }

    fn branding_with_assets() -> (BrandingConfig, StaticAssets) {
        let branding = BrandingConfig::default();
        let mut assets = StaticAssets::new();
        assets.insert(branding.logo_url.clone(), "image/png", vec![0x89, 0x50]);

        (branding, assets)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap_or_default()
    }

    #[test]
    fn block_sequence_is_fixed() -> TestResult {
        let (branding, assets) = branding_with_assets();
        let composer = Composer::new(&branding, &assets);

        let document = block_on(composer.compose_on(&summary(), date()))?;

        assert_eq!(document.blocks.len(), 5);
        assert!(matches!(document.blocks.first(), Some(Block::Background { .. })));
        assert!(matches!(document.blocks.get(1), Some(Block::Branding { .. })));
        assert!(matches!(
            document.blocks.get(2),
            Some(Block::Heading { text }) if text == "Заказ"
        ));
        assert!(matches!(document.blocks.get(3), Some(Block::CustomerInfo { .. })));
        assert!(matches!(document.blocks.get(4), Some(Block::Table { .. })));

        Ok(())
    }

    #[test]
    fn table_has_one_service_header_per_item_and_one_total_row() -> anyhow::Result<()> {
        let (branding, assets) = branding_with_assets();
        let composer = Composer::new(&branding, &assets);

        let document = block_on(composer.compose_on(&summary(), date()))?;

        let Some(Block::Table { rows, .. }) = document.blocks.last() else {
            anyhow::bail!("expected a table block");
        };

        let headers: Vec<&str> = rows
            .iter()
            .filter_map(|row| match row {
                TableRow::ServiceHeader { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headers, vec!["Print", "Retouching"]);

        let totals: Vec<&TableRow> = rows
            .iter()
            .filter(|row| matches!(row, TableRow::Total { .. }))
            .collect();
        assert_eq!(totals.len(), 1);
        assert!(matches!(
            rows.last(),
            Some(TableRow::Total { amount, .. }) if amount == "900 ₽"
        ));

        Ok(())
    }

    #[test]
    fn monetary_cells_carry_the_currency_suffix() -> anyhow::Result<()> {
        let (branding, assets) = branding_with_assets();
        let composer = Composer::new(&branding, &assets);

        let document = block_on(composer.compose_on(&summary(), date()))?;

        let Some(Block::Table { rows, .. }) = document.blocks.last() else {
            anyhow::bail!("expected a table block");
        };

        assert!(matches!(
            rows.get(1),
            Some(TableRow::VariantLine { price, total, .. })
                if price == "100 ₽" && total == "200 ₽"
        ));

        Ok(())
    }

    #[test]
    fn logo_is_embedded_and_date_localised() -> TestResult {
        let (branding, assets) = branding_with_assets();
        let composer = Composer::new(&branding, &assets);

        let document = block_on(composer.compose_on(&summary(), date()))?;

        assert!(matches!(
            document.blocks.get(1),
            Some(Block::Branding { logo: ImageRef::Embedded { mime, .. }, .. }) if mime == "image/png"
        ));
        assert!(matches!(
            document.blocks.get(3),
            Some(Block::CustomerInfo { date, .. }) if date == "Дата: 24.08.2026"
        ));

        Ok(())
    }

    #[test]
    fn missing_logo_fails_composition() {
        let branding = BrandingConfig::default();
        let assets = StaticAssets::new();
        let composer = Composer::new(&branding, &assets);

        let result = block_on(composer.compose_on(&summary(), date()));

        assert!(matches!(result, Err(ComposeError::Asset(_))));
    }

    #[test]
    fn composition_does_not_mutate_the_summary() -> TestResult {
        let (branding, assets) = branding_with_assets();
        let composer = Composer::new(&branding, &assets);

        let input = summary();
        let before = input.clone();
        let _document = block_on(composer.compose_on(&input, date()))?;

        assert_eq!(input, before);

        Ok(())
    }
}
