//! Order normalisation
//!
//! Maps the raw, loosely-structured form snapshot submitted by the browser
//! into a normalised [`OrderSummary`] with priced variant lines and a grand
//! total. Pure and deterministic: the same snapshot always yields a
//! structurally identical summary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::parse_currency_integer;

/// Errors raised while reading a raw order form.
#[derive(Debug, Error)]
pub enum OrderFormError {
    /// The form snapshot is missing the required shape.
    #[error("malformed order form: {0}")]
    MalformedInput(&'static str),

    /// The snapshot is not valid JSON or does not match the form types.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Catalog product referenced by a form entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    /// Catalog identifier.
    #[serde(default)]
    pub uid: u64,

    /// Product title, used as the service name on the order.
    pub title: String,
}

/// One selectable variant row of a form entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FormVariant {
    /// Variant title.
    pub title: String,

    /// Price as the raw catalog string.
    pub price: String,

    /// Number of units requested.
    pub quantity: u32,

    /// Whether the visitor ticked this variant. Custom entries carry no
    /// flag and default to unchecked.
    #[serde(default)]
    pub checked: bool,
}

/// One entry of the submitted form: a catalog product with selectable
/// variants, or a free-form custom line with no `product`.
#[derive(Debug, Clone, Deserialize)]
pub struct FormProduct {
    /// The catalog product, absent for custom entries.
    #[serde(default)]
    pub product: Option<CatalogProduct>,

    /// Variant rows of this entry.
    #[serde(default)]
    pub variants: Vec<FormVariant>,
}

/// Raw submitted order form. Transient; exists only for the duration of one
/// submission.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    /// Customer name. Older form revisions submitted this as
    /// `customerName`; both spellings are accepted.
    #[serde(default, alias = "customerName")]
    pub name: String,

    /// Customer email address.
    #[serde(default)]
    pub email: String,

    /// Submitted form entries.
    pub products: Vec<FormProduct>,
}

impl OrderForm {
    /// Reads a form from a raw JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`OrderFormError::MalformedInput`] when `products` is absent
    /// or not a sequence, and [`OrderFormError::Json`] when the snapshot is
    /// not valid JSON or a field has the wrong type.
    pub fn from_json(raw: &str) -> Result<Self, OrderFormError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        match value.get("products") {
            Some(serde_json::Value::Array(_)) => {}
            Some(_) => {
                return Err(OrderFormError::MalformedInput(
                    "products is not a sequence",
                ));
            }
            None => return Err(OrderFormError::MalformedInput("products is missing")),
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// One priced variant line of a normalised order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderVariantLine {
    /// Variant name.
    pub name: String,

    /// Unit price in whole currency units, truncated from the raw string.
    pub price: i64,

    /// Number of units.
    pub quantity: u32,

    /// Line total, exactly `price * quantity`.
    pub total: i64,
}

/// Variant lines grouped under one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    /// Service heading shown above the variant lines.
    pub service_name: String,

    /// Priced variant lines.
    pub variants: Vec<OrderVariantLine>,
}

/// Normalised, priced representation of a submitted order. Recomputed fresh
/// on every submission and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Customer name.
    pub name: String,

    /// Customer email address.
    pub email: String,

    /// Ordered items that made it through filtering.
    pub items: Vec<OrderItem>,

    /// Grand total over all variant lines.
    pub total_sum: i64,
}

/// Normalises a raw order form into an [`OrderSummary`].
///
/// Catalog entries are kept iff at least one variant is checked with a
/// positive quantity; custom entries are kept iff their first variant has a
/// non-empty title and price. Variant prices use whole-unit truncation.
#[must_use]
pub fn normalize(form: &OrderForm) -> OrderSummary {
    let items: Vec<OrderItem> = form.products.iter().filter_map(order_item).collect();

    let total_sum = items
        .iter()
        .flat_map(|item| &item.variants)
        .map(|variant| variant.total)
        .sum();

    OrderSummary {
        name: form.name.clone(),
        email: form.email.clone(),
        items,
        total_sum,
    }
}

fn order_item(entry: &FormProduct) -> Option<OrderItem> {
    if let Some(product) = &entry.product {
        let variants: Vec<OrderVariantLine> = entry
            .variants
            .iter()
            .filter(|variant| variant.checked && variant.quantity > 0)
            .map(variant_line)
            .collect();

        if variants.is_empty() {
            return None;
        }

        Some(OrderItem {
            service_name: product.title.clone(),
            variants,
        })
    } else {
        let first = entry.variants.first()?;

        if first.title.is_empty() || first.price.is_empty() {
            return None;
        }

        Some(OrderItem {
            service_name: first.title.clone(),
            variants: vec![variant_line(first)],
        })
    }
}

fn variant_line(variant: &FormVariant) -> OrderVariantLine {
    let price = parse_currency_integer(&variant.price);

    OrderVariantLine {
        name: variant.title.clone(),
        price,
        quantity: variant.quantity,
        total: price * i64::from(variant.quantity),
    }
}
