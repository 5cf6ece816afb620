//! Cart and checkout domain core for MealKit.
//!
//! - **Catalog**: read-only items supplied by a catalog collaborator
//! - **Cart**: the cart ledger with per-item quantity limits, change events,
//!   and a shared handle
//! - **Checkout**: form validation, a simulated payment step, and the
//!   workflow that places the order
//!
//! # Example
//!
//! ```rust,no_run
//! use mealkit_commerce::prelude::*;
//!
//! # async fn demo() -> Result<(), CommerceError> {
//! let cart = CartHandle::default();
//! let bowl = Item::new("caesar", "Keto Chicken Caesar Bowl", Money::new(1299, Currency::AUD));
//! cart.add(bowl, 2)?;
//!
//! let workflow = CheckoutWorkflow::new();
//! let form = OrderForm::new("Alice", "a@b.com", "1 Main St");
//! let confirmation = workflow.submit(&cart, &form, &CancelToken::new()).await?;
//! println!("{}", confirmation.message());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use cart::MAX_PER_ITEM;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Catalog, Item, Nutrition};

    // Cart
    pub use crate::cart::{
        CartEvent, CartHandle, CartLedger, CartLine, CartSubscription, CartSummary, LineSummary,
        MAX_PER_ITEM,
    };

    // Checkout
    pub use crate::checkout::{
        CancelToken, CheckoutState, CheckoutWorkflow, OrderConfirmation, OrderForm,
        PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway, StateTransition,
        DEFAULT_PAYMENT_LATENCY,
    };
}
