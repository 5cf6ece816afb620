//! Read-only cart snapshots for display.

use crate::cart::{CartLedger, CartLine};
use crate::ids::{ItemId, LineId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a cart with its aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSummary {
    pub currency: Currency,
    pub lines: Vec<LineSummary>,
    /// Sum of quantities.
    pub item_count: i64,
    /// Sum of line totals.
    pub subtotal: Money,
}

impl CartSummary {
    pub(crate) fn from_ledger(ledger: &CartLedger) -> Self {
        Self {
            currency: ledger.currency(),
            lines: ledger.lines().iter().map(LineSummary::from).collect(),
            item_count: ledger.item_count(),
            subtotal: ledger.subtotal(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One line of a [`CartSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSummary {
    pub line_id: LineId,
    pub item_id: ItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_total: Money,
}

impl From<&CartLine> for LineSummary {
    fn from(line: &CartLine) -> Self {
        Self {
            line_id: line.id.clone(),
            item_id: line.item.id.clone(),
            name: line.item.name.clone(),
            unit_price: line.item.price,
            quantity: line.quantity,
            line_total: line.line_total(),
        }
    }
}
