//! Checkout module.
//!
//! Contains the order form, the checkout workflow, the payment seam, and the
//! order confirmation.

mod cancel;
mod flow;
mod form;
mod order;
mod payment;

pub use cancel::CancelToken;
pub use flow::{CheckoutState, CheckoutWorkflow, StateTransition, TransitionStream};
pub use form::{is_valid_email, OrderForm};
pub use order::OrderConfirmation;
pub use payment::{
    PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway, DEFAULT_PAYMENT_LATENCY,
};
