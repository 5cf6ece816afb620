//! Cart ledger and cart line types.

use crate::cart::{CartEvent, CartEvents, CartSubscription, CartSummary};
use crate::catalog::Item;
use crate::error::CommerceError;
use crate::ids::{ItemId, LineId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum quantity allowed per item.
pub const MAX_PER_ITEM: i64 = 20;

/// The shopping cart: one line per distinct item, in insertion order.
///
/// Every line holds a quantity in `[1, max_per_item]`. Item count and
/// subtotal are always derived from the lines. A mutation that returns an
/// error leaves the lines exactly as they were.
#[derive(Debug)]
pub struct CartLedger {
    lines: Vec<CartLine>,
    currency: Currency,
    max_per_item: i64,
    events: CartEvents,
}

impl CartLedger {
    /// Create an empty ledger pricing in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            max_per_item: MAX_PER_ITEM,
            events: CartEvents::new(),
        }
    }

    /// Override the per-item quantity limit. Values below 1 are raised to 1.
    pub fn with_max_per_item(mut self, limit: i64) -> Self {
        self.max_per_item = limit.max(1);
        self
    }

    /// Add `quantity` of an item.
    ///
    /// Merges into the item's existing line when there is one. Returns an
    /// error if:
    /// - `quantity` is below 1
    /// - the resulting line quantity would exceed the per-item limit
    /// - the item has a negative price or is priced in another currency
    pub fn add(&mut self, item: Item, quantity: i64) -> Result<LineId, CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity { quantity });
        }
        if item.price.is_negative() {
            return Err(CommerceError::NegativePrice { item_id: item.id });
        }

        if let Some(index) = self.index_of_item(&item.id) {
            let line = &self.lines[index];
            let new_quantity = line
                .quantity
                .checked_add(quantity)
                .filter(|q| *q <= self.max_per_item)
                .ok_or(CommerceError::MaxPerItemExceeded {
                    limit: self.max_per_item,
                })?;
            self.ensure_priceable(Some(index), &line.item.price, new_quantity)?;

            let line = &mut self.lines[index];
            let previous = line.quantity;
            line.quantity = new_quantity;
            let (line_id, item_id) = (line.id.clone(), line.item.id.clone());
            debug!(%line_id, %item_id, previous, quantity = new_quantity, "cart line merged");
            self.events.publish(CartEvent::QuantityChanged {
                line_id: line_id.clone(),
                item_id,
                previous,
                quantity: new_quantity,
            });
            return Ok(line_id);
        }

        if quantity > self.max_per_item {
            return Err(CommerceError::MaxPerItemExceeded {
                limit: self.max_per_item,
            });
        }
        self.ensure_priceable(None, &item.price, quantity)?;

        let line = CartLine::new(item, quantity);
        let line_id = line.id.clone();
        let item_id = line.item.id.clone();
        self.lines.push(line);
        debug!(%line_id, %item_id, quantity, "cart line added");
        self.events.publish(CartEvent::LineAdded {
            line_id: line_id.clone(),
            item_id,
            quantity,
        });
        Ok(line_id)
    }

    /// Add a single unit of an item.
    pub fn add_one(&mut self, item: Item) -> Result<LineId, CommerceError> {
        self.add(item, 1)
    }

    /// Replace a line's quantity.
    ///
    /// Checks run in order: the line must exist, the quantity must be at
    /// least 1, and it must not exceed the per-item limit.
    pub fn set_quantity(&mut self, line_id: &LineId, quantity: i64) -> Result<(), CommerceError> {
        let index = self
            .index_of_line(line_id)
            .ok_or_else(|| CommerceError::LineNotFound {
                line_id: line_id.clone(),
            })?;

        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity { quantity });
        }
        if quantity > self.max_per_item {
            return Err(CommerceError::MaxPerItemExceeded {
                limit: self.max_per_item,
            });
        }
        self.ensure_priceable(Some(index), &self.lines[index].item.price, quantity)?;

        let line = &mut self.lines[index];
        let previous = line.quantity;
        if previous == quantity {
            return Ok(());
        }
        line.quantity = quantity;
        let item_id = line.item.id.clone();
        debug!(%line_id, %item_id, previous, quantity, "cart quantity set");
        self.events.publish(CartEvent::QuantityChanged {
            line_id: line_id.clone(),
            item_id,
            previous,
            quantity,
        });
        Ok(())
    }

    /// Raise a line's quantity by one.
    pub fn increment(&mut self, line_id: &LineId) -> Result<(), CommerceError> {
        let current = self.quantity_of(line_id)?;
        self.set_quantity(line_id, current.saturating_add(1))
    }

    /// Lower a line's quantity by one. Fails at quantity 1 instead of removing.
    pub fn decrement(&mut self, line_id: &LineId) -> Result<(), CommerceError> {
        let current = self.quantity_of(line_id)?;
        self.set_quantity(line_id, current - 1)
    }

    /// Remove a line. Returns false if no line had that id.
    pub fn remove(&mut self, line_id: &LineId) -> bool {
        let Some(index) = self.index_of_line(line_id) else {
            return false;
        };
        let line = self.lines.remove(index);
        debug!(%line_id, item_id = %line.item.id, "cart line removed");
        self.events.publish(CartEvent::LineRemoved {
            line_id: line.id,
            item_id: line.item.id,
        });
        true
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let lines_removed = self.lines.len();
        self.lines.clear();
        debug!(lines_removed, "cart cleared");
        self.events.publish(CartEvent::Cleared { lines_removed });
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money {
        let cents = self
            .lines
            .iter()
            .fold(0_i64, |acc, l| acc.saturating_add(l.line_total().amount_cents));
        Money::new(cents, self.currency)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.id == line_id)
    }

    pub fn line_for_item(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    pub fn unique_item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn max_per_item(&self) -> i64 {
        self.max_per_item
    }

    /// Snapshot of the cart for display.
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_ledger(self)
    }

    /// Subscribe to cart change events.
    pub fn subscribe(&self) -> CartSubscription {
        self.events.subscribe()
    }

    fn quantity_of(&self, line_id: &LineId) -> Result<i64, CommerceError> {
        self.line(line_id)
            .map(|l| l.quantity)
            .ok_or_else(|| CommerceError::LineNotFound {
                line_id: line_id.clone(),
            })
    }

    fn index_of_line(&self, line_id: &LineId) -> Option<usize> {
        self.lines.iter().position(|l| &l.id == line_id)
    }

    fn index_of_item(&self, item_id: &ItemId) -> Option<usize> {
        self.lines.iter().position(|l| &l.item.id == item_id)
    }

    /// Check that the subtotal stays representable if line `index` (or a new
    /// line when `None`) held `quantity` units at `price`.
    fn ensure_priceable(
        &self,
        index: Option<usize>,
        price: &Money,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: price.currency.code().to_string(),
            });
        }
        let changed = price.try_multiply(quantity).ok_or(CommerceError::Overflow)?;
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != index)
            .try_fold(changed, |acc, (_, line)| acc.try_add(&line.line_total()))
            .map(|_| ())
            .ok_or(CommerceError::Overflow)
    }
}

impl Default for CartLedger {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// One cart entry: an item and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Opaque line identifier.
    pub id: LineId,
    /// The item, as supplied by the catalog.
    pub item: Item,
    /// Quantity, at least 1.
    pub quantity: i64,
}

impl CartLine {
    fn new(item: Item, quantity: i64) -> Self {
        Self {
            id: LineId::generate(),
            item,
            quantity,
        }
    }

    /// `quantity × unit price`.
    pub fn line_total(&self) -> Money {
        Money::new(
            self.item.price.amount_cents.saturating_mul(self.quantity),
            self.item.price.currency,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caesar() -> Item {
        Item::new("caesar", "Keto Chicken Caesar Bowl", Money::new(1299, Currency::AUD))
    }

    fn poke() -> Item {
        Item::new("poke", "Tuna Poke Bowl", Money::new(1349, Currency::AUD))
    }

    #[test]
    fn test_add_item() {
        let mut cart = CartLedger::default();
        cart.add(caesar(), 2).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.subtotal(), Money::new(2598, Currency::AUD));
    }

    #[test]
    fn test_add_same_item_merges_lines() {
        let mut cart = CartLedger::default();
        let first = cart.add(caesar(), 1).unwrap();
        let second = cart.add(caesar(), 2).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = CartLedger::default();
        assert_eq!(
            cart.add(caesar(), 0),
            Err(CommerceError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(
            cart.add(caesar(), -3),
            Err(CommerceError::InvalidQuantity { quantity: -3 })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_new_line_over_limit() {
        let mut cart = CartLedger::default();
        assert_eq!(
            cart.add(caesar(), MAX_PER_ITEM + 1),
            Err(CommerceError::MaxPerItemExceeded { limit: 20 })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_over_limit_leaves_line_unchanged() {
        let mut cart = CartLedger::default();
        cart.add(caesar(), 15).unwrap();
        let before = cart.lines().to_vec();

        assert_eq!(
            cart.add(caesar(), 6),
            Err(CommerceError::MaxPerItemExceeded { limit: 20 })
        );
        assert_eq!(cart.lines(), before.as_slice());

        cart.add(caesar(), 5).unwrap();
        assert_eq!(cart.item_count(), 20);
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let mut cart = CartLedger::default();
        let item = Item::new("burrito", "Lean Beef Burrito", Money::new(1299, Currency::USD));
        assert!(matches!(
            cart.add(item, 1),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_negative_price() {
        let mut cart = CartLedger::default();
        let item = Item::new("refund", "Refund Bowl", Money::new(-500, Currency::AUD));
        assert_eq!(
            cart.add(item, 1),
            Err(CommerceError::NegativePrice {
                item_id: ItemId::new("refund")
            })
        );
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero(Currency::AUD));
    }

    #[test]
    fn test_add_rejects_overflowing_subtotal() {
        let mut cart = CartLedger::default();
        let item = Item::new("gold", "Gold Bowl", Money::new(i64::MAX / 2, Currency::AUD));
        assert_eq!(cart.add(item, 3), Err(CommerceError::Overflow));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = CartLedger::default();
        let line_id = cart.add(caesar(), 3).unwrap();

        cart.set_quantity(&line_id, 5).unwrap();
        assert_eq!(cart.item_count(), 5);

        cart.set_quantity(&line_id, 1).unwrap();
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_set_quantity_error_order() {
        let mut cart = CartLedger::default();
        let line_id = cart.add(caesar(), 3).unwrap();
        let missing = LineId::new("line_missing");

        // Missing line wins over a bad quantity.
        assert_eq!(
            cart.set_quantity(&missing, 0),
            Err(CommerceError::LineNotFound {
                line_id: missing.clone()
            })
        );
        assert_eq!(
            cart.set_quantity(&line_id, 0),
            Err(CommerceError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(
            cart.set_quantity(&line_id, 21),
            Err(CommerceError::MaxPerItemExceeded { limit: 20 })
        );
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = CartLedger::default();
        let line_id = cart.add(caesar(), 1).unwrap();

        cart.increment(&line_id).unwrap();
        assert_eq!(cart.line(&line_id).unwrap().quantity, 2);

        cart.decrement(&line_id).unwrap();
        assert_eq!(
            cart.decrement(&line_id),
            Err(CommerceError::InvalidQuantity { quantity: 0 })
        );
        assert_eq!(cart.line(&line_id).unwrap().quantity, 1);

        cart.set_quantity(&line_id, MAX_PER_ITEM).unwrap();
        assert_eq!(
            cart.increment(&line_id),
            Err(CommerceError::MaxPerItemExceeded { limit: 20 })
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartLedger::default();
        let line_id = cart.add(caesar(), 1).unwrap();
        cart.add(poke(), 2).unwrap();

        assert!(cart.remove(&line_id));
        assert!(!cart.remove(&line_id));
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = CartLedger::default();
        cart.add(poke(), 1).unwrap();
        cart.add(caesar(), 1).unwrap();
        cart.add(poke(), 1).unwrap();

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.item.id.as_str()).collect();
        assert_eq!(ids, vec!["poke", "caesar"]);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartLedger::default();
        cart.add(caesar(), 2).unwrap();
        cart.add(poke(), 4).unwrap();

        cart.clear();
        cart.clear();
        assert_eq!(cart.item_count(), 0);
        assert!(cart.subtotal().is_zero());
    }

    #[test]
    fn test_custom_limit() {
        let mut cart = CartLedger::new(Currency::AUD).with_max_per_item(5);
        assert_eq!(
            cart.add(caesar(), 6),
            Err(CommerceError::MaxPerItemExceeded { limit: 5 })
        );
        assert!(cart.add(caesar(), 5).is_ok());
    }

    #[test]
    fn test_mutations_publish_events() {
        let mut cart = CartLedger::default();
        let mut events = cart.subscribe();

        let line_id = cart.add(caesar(), 1).unwrap();
        cart.set_quantity(&line_id, 3).unwrap();
        let _ = cart.set_quantity(&line_id, 0);
        assert!(!cart.remove(&LineId::new("nope")));
        cart.clear();

        assert!(matches!(
            events.try_recv(),
            Some(CartEvent::LineAdded { quantity: 1, .. })
        ));
        assert!(matches!(
            events.try_recv(),
            Some(CartEvent::QuantityChanged {
                previous: 1,
                quantity: 3,
                ..
            })
        ));
        assert_eq!(events.try_recv(), Some(CartEvent::Cleared { lines_removed: 1 }));
        assert_eq!(events.try_recv(), None);
    }
}
