//! Cart
//!
//! In-memory store for the products a visitor has selected before
//! submitting the order form. Pure state container, no I/O; insertion
//! order is display order.

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};

use crate::money::parse_currency_float;

/// One selected product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Catalog product identifier, unique within the cart by convention.
    pub uid: u64,

    /// Product title shown in the cart.
    pub title: String,

    /// Price as the raw catalog string, e.g. `"100"` or `"50.00"`.
    pub price: String,

    /// Number of units.
    pub quantity: u32,
}

/// Partial update applied to a cart line; omitted fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct CartLineUpdate {
    /// New title, if any.
    pub title: Option<String>,

    /// New price string, if any.
    pub price: Option<String>,

    /// New quantity, if any.
    pub quantity: Option<u32>,
}

/// How [`Cart::add_product`] treats a uid that is already in the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddStrategy {
    /// Legacy behaviour: always append a fresh line with quantity 1, even
    /// when the uid is already present. The existing-line lookup is
    /// performed and its result discarded, exactly as the historical
    /// implementation did.
    #[default]
    AppendFresh,

    /// Re-adding an existing uid increments that line's quantity instead
    /// of appending a duplicate line.
    IncrementExisting,
}

/// Cart
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    add_strategy: AddStrategy,
}

impl Cart {
    /// Creates an empty cart with the legacy add strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cart with the given add strategy.
    #[must_use]
    pub fn with_strategy(add_strategy: AddStrategy) -> Self {
        Cart {
            lines: Vec::new(),
            add_strategy,
        }
    }

    /// Adds a product to the cart.
    ///
    /// The new line's quantity is forced to 1 regardless of the quantity on
    /// the input. Under [`AddStrategy::AppendFresh`] a duplicate uid appends
    /// a second line; callers must prevent duplicate adds if uniqueness is
    /// required.
    pub fn add_product(&mut self, product: CartLine) {
        let existing = self.lines.iter().position(|line| line.uid == product.uid);

        match self.add_strategy {
            AddStrategy::AppendFresh => {
                // Lookup result intentionally unused, preserved from the
                // original store.
                let _ = existing;

                self.lines.push(CartLine {
                    quantity: 1,
                    ..product
                });
            }
            AddStrategy::IncrementExisting => {
                if let Some(line) = existing.and_then(|idx| self.lines.get_mut(idx)) {
                    line.quantity = line.quantity.saturating_add(1);
                } else {
                    self.lines.push(CartLine {
                        quantity: 1,
                        ..product
                    });
                }
            }
        }
    }

    /// Removes every line with the given uid; no-op when absent.
    pub fn remove_product(&mut self, uid: u64) {
        self.lines.retain(|line| line.uid != uid);
    }

    /// Merges the update into the matching line in place; no-op when the
    /// uid is not found.
    pub fn update_product(&mut self, uid: u64, update: CartLineUpdate) {
        let Some(line) = self.lines.iter_mut().find(|line| line.uid == uid) else {
            return;
        };

        if let Some(title) = update.title {
            line.title = title;
        }

        if let Some(price) = update.price {
            line.price = price;
        }

        if let Some(quantity) = update.quantity {
            line.quantity = quantity;
        }
    }

    /// Empties the cart unconditionally.
    pub fn clear_products(&mut self) {
        self.lines.clear();
    }

    /// Total price over all lines, formatted to exactly two decimal places.
    ///
    /// Each line contributes `price * quantity` using the leading-decimal
    /// price parse; malformed prices contribute 0. Intermediate sums keep
    /// full floating precision, with half-up rounding applied only at the
    /// final formatting step.
    #[must_use]
    pub fn total_price(&self) -> String {
        let total: f64 = self
            .lines
            .iter()
            .map(|line| parse_currency_float(&line.price) * f64::from(line.quantity))
            .sum();

        let rounded = Decimal::from_f64(total)
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        format!("{rounded:.2}")
    }

    /// Returns the line with the given uid, if present.
    #[must_use]
    pub fn get(&self, uid: u64) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.uid == uid)
    }

    /// Iterates over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(uid: u64, price: &str, quantity: u32) -> CartLine {
        CartLine {
            uid,
            title: format!("Product {uid}"),
            price: price.to_string(),
            quantity,
        }
    }

    #[test]
    fn add_forces_quantity_to_one() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "50.00", 5));

        assert_eq!(cart.total_price(), "50.00");
        assert_eq!(cart.get(1).map(|l| l.quantity), Some(1));
    }

    #[test]
    fn add_appends_duplicate_uid_under_legacy_strategy() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.add_product(line(1, "100", 1));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_price(), "200.00");
    }

    #[test]
    fn increment_strategy_bumps_existing_line() {
        let mut cart = Cart::with_strategy(AddStrategy::IncrementExisting);

        cart.add_product(line(1, "100", 1));
        cart.add_product(line(1, "100", 1));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(1).map(|l| l.quantity), Some(2));
        assert_eq!(cart.total_price(), "200.00");
    }

    #[test]
    fn remove_missing_uid_is_noop() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.remove_product(42);

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn remove_drops_all_matching_lines() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.add_product(line(1, "100", 1));
        cart.add_product(line(2, "10", 1));

        cart.remove_product(1);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_price(), "10.00");
    }

    #[test]
    fn update_merges_partial_fields() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.update_product(
            1,
            CartLineUpdate {
                quantity: Some(3),
                ..CartLineUpdate::default()
            },
        );

        let updated = cart.get(1).cloned();
        assert_eq!(updated.as_ref().map(|l| l.quantity), Some(3));
        assert_eq!(updated.as_ref().map(|l| l.price.as_str()), Some("100"));
        assert_eq!(cart.total_price(), "300.00");
    }

    #[test]
    fn update_missing_uid_is_noop() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.update_product(
            9,
            CartLineUpdate {
                price: Some("1".to_string()),
                ..CartLineUpdate::default()
            },
        );

        assert_eq!(cart.total_price(), "100.00");
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "100", 1));
        cart.add_product(line(2, "200", 1));

        cart.clear_products();

        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), "0.00");
    }

    #[test]
    fn total_ignores_malformed_prices() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "not a price", 1));
        cart.add_product(line(2, "19.99", 1));
        cart.update_product(
            2,
            CartLineUpdate {
                quantity: Some(2),
                ..CartLineUpdate::default()
            },
        );

        assert_eq!(cart.total_price(), "39.98");
    }

    #[test]
    fn total_rounds_half_up_at_the_end() {
        let mut cart = Cart::new();

        cart.add_product(line(1, "0.125", 1));

        assert_eq!(cart.total_price(), "0.13");
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut cart = Cart::new();

        cart.add_product(line(3, "1", 1));
        cart.add_product(line(1, "2", 1));
        cart.add_product(line(2, "3", 1));

        let uids: Vec<u64> = cart.iter().map(|l| l.uid).collect();
        assert_eq!(uids, vec![3, 1, 2]);
    }
}
