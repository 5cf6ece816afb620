//! Shopping cart module.
//!
//! Contains the cart ledger, its lines, change events, and the shared handle.

mod events;
mod handle;
mod ledger;
mod summary;

pub use events::{CartEvent, CartSubscription};
pub(crate) use events::CartEvents;
pub use handle::CartHandle;
pub use ledger::{CartLedger, CartLine, MAX_PER_ITEM};
pub use summary::{CartSummary, LineSummary};
