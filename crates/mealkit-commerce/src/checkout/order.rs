//! Placed order confirmation.

use crate::cart::{CartSummary, LineSummary};
use crate::checkout::{OrderForm, PaymentReceipt};
use crate::ids::{CheckoutId, OrderId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the caller gets back when an order is placed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub checkout_id: CheckoutId,
    /// Name as submitted on the form.
    pub customer_name: String,
    pub email: String,
    pub address: String,
    /// Lines as they were when the order was validated.
    pub lines: Vec<LineSummary>,
    pub item_count: i64,
    pub subtotal: Money,
    pub receipt: PaymentReceipt,
    pub placed_at: DateTime<Utc>,
}

impl OrderConfirmation {
    pub(crate) fn new(
        checkout_id: CheckoutId,
        form: &OrderForm,
        cart: CartSummary,
        receipt: PaymentReceipt,
    ) -> Self {
        Self {
            order_id: OrderId::generate(),
            checkout_id,
            customer_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            address: form.address.trim().to_string(),
            lines: cart.lines,
            item_count: cart.item_count,
            subtotal: cart.subtotal,
            receipt,
            placed_at: Utc::now(),
        }
    }

    /// Short thank-you line for the confirmation dialog.
    pub fn message(&self) -> String {
        format!("Thanks, {}. Your meals are on the way", self.customer_name)
    }
}
