//! Shared access to a single cart.

use crate::cart::{CartLedger, CartLine, CartSubscription, CartSummary};
use crate::catalog::Item;
use crate::error::CommerceError;
use crate::ids::LineId;
use crate::money::Money;
use std::sync::{Arc, Mutex, MutexGuard};

/// A cloneable handle to one cart.
///
/// Every clone refers to the same ledger. Each call takes the ledger's lock
/// for its whole duration, so a reader never sees a half-applied mutation.
/// The lock is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct CartHandle {
    inner: Arc<Mutex<CartLedger>>,
}

impl CartHandle {
    pub fn new(ledger: CartLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn add(&self, item: Item, quantity: i64) -> Result<LineId, CommerceError> {
        self.lock().add(item, quantity)
    }

    pub fn set_quantity(&self, line_id: &LineId, quantity: i64) -> Result<(), CommerceError> {
        self.lock().set_quantity(line_id, quantity)
    }

    pub fn increment(&self, line_id: &LineId) -> Result<(), CommerceError> {
        self.lock().increment(line_id)
    }

    pub fn decrement(&self, line_id: &LineId) -> Result<(), CommerceError> {
        self.lock().decrement(line_id)
    }

    pub fn remove(&self, line_id: &LineId) -> bool {
        self.lock().remove(line_id)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn item_count(&self) -> i64 {
        self.lock().item_count()
    }

    pub fn subtotal(&self) -> Money {
        self.lock().subtotal()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current lines.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    pub fn summary(&self) -> CartSummary {
        self.lock().summary()
    }

    pub fn subscribe(&self) -> CartSubscription {
        self.lock().subscribe()
    }

    /// Run `f` against the ledger under the lock.
    pub fn with<R>(&self, f: impl FnOnce(&CartLedger) -> R) -> R {
        f(&self.lock())
    }

    // Ledger operations either complete or leave state untouched, so a
    // poisoned lock still guards a consistent ledger.
    fn lock(&self) -> MutexGuard<'_, CartLedger> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl From<CartLedger> for CartHandle {
    fn from(ledger: CartLedger) -> Self {
        Self::new(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_clones_share_one_cart() {
        let cart = CartHandle::default();
        let view = cart.clone();

        cart.add(
            Item::new("meatballs", "BBQ Turkey Meatballs", Money::new(1199, Currency::AUD)),
            2,
        )
        .unwrap();

        assert_eq!(view.item_count(), 2);
        assert_eq!(view.subtotal(), Money::new(2398, Currency::AUD));

        view.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_concurrent_adds_respect_limit() {
        let cart = CartHandle::default();
        let item = Item::new("pasta", "Chicken Pesto Pasta", Money::new(1299, Currency::AUD));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let cart = cart.clone();
                let item = item.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        let _ = cart.add(item.clone(), 1);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(cart.item_count(), 20);
        assert_eq!(cart.lines().len(), 1);
    }
}
