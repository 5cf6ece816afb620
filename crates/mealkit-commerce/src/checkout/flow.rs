//! Checkout workflow state machine.

use crate::cart::{CartHandle, CartSummary};
use crate::checkout::{
    CancelToken, OrderConfirmation, OrderForm, PaymentGateway, PaymentRequest, SimulatedGateway,
};
use crate::error::CommerceError;
use crate::ids::CheckoutId;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{info, warn};

const TRANSITION_CHANNEL_CAPACITY: usize = 32;

/// Where a checkout is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CheckoutState {
    /// Waiting for a submission.
    Idle,
    /// Checking the cart and the form.
    Validating,
    /// Waiting on the payment gateway.
    Submitting,
    /// Order placed. Terminal.
    Confirmed,
    /// Validation failed. Published, then immediately followed by `Idle`.
    Failed(CommerceError),
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Validating => "validating",
            CheckoutState::Submitting => "submitting",
            CheckoutState::Confirmed => "confirmed",
            CheckoutState::Failed(_) => "failed",
        }
    }

    /// A submission is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, CheckoutState::Validating | CheckoutState::Submitting)
    }
}

/// One state change, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTransition {
    pub from: CheckoutState,
    pub to: CheckoutState,
}

/// Receiver for a workflow's state transitions.
pub type TransitionStream = broadcast::Receiver<StateTransition>;

#[derive(Debug)]
struct Inner {
    state: CheckoutState,
    confirmation: Option<OrderConfirmation>,
    last_error: Option<CommerceError>,
}

/// Validates a cart and form, takes payment, and places one order.
///
/// Create one workflow per checkout attempt. `submit` may be retried after a
/// validation failure or a cancellation; once an order is confirmed the
/// workflow refuses further submissions.
pub struct CheckoutWorkflow {
    id: CheckoutId,
    gateway: Arc<dyn PaymentGateway>,
    inner: Mutex<Inner>,
    transitions: broadcast::Sender<StateTransition>,
}

impl CheckoutWorkflow {
    /// Create a workflow backed by the simulated gateway.
    pub fn new() -> Self {
        Self::with_gateway(Arc::new(SimulatedGateway::default()))
    }

    pub fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        Self {
            id: CheckoutId::generate(),
            gateway,
            inner: Mutex::new(Inner {
                state: CheckoutState::Idle,
                confirmation: None,
                last_error: None,
            }),
            transitions,
        }
    }

    pub fn id(&self) -> &CheckoutId {
        &self.id
    }

    pub fn state(&self) -> CheckoutState {
        self.lock().state.clone()
    }

    /// The placed order, once confirmed.
    pub fn confirmation(&self) -> Option<OrderConfirmation> {
        self.lock().confirmation.clone()
    }

    /// The most recent validation failure, cleared by the next successful submit.
    pub fn last_error(&self) -> Option<CommerceError> {
        self.lock().last_error.clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> TransitionStream {
        self.transitions.subscribe()
    }

    /// Validate and place the order.
    ///
    /// Validation runs in a fixed order and reports only the first failure:
    /// empty cart, name, email, address. On success the gateway is charged,
    /// then the cart is cleared and the confirmation returned. The cart's lock
    /// is not held while the payment is pending.
    ///
    /// Cancelling `cancel` (or dropping the returned future) before payment
    /// completes returns the workflow to `Idle` with the cart untouched.
    pub async fn submit(
        &self,
        cart: &CartHandle,
        form: &OrderForm,
        cancel: &CancelToken,
    ) -> Result<OrderConfirmation, CommerceError> {
        self.begin()?;
        let _guard = SubmissionGuard { workflow: self };

        let snapshot = match cart.with(|ledger| {
            if ledger.is_empty() {
                return Err(CommerceError::CartIsEmpty);
            }
            form.validate()?;
            Ok(ledger.summary())
        }) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                self.fail(reason.clone());
                return Err(reason);
            }
        };

        self.transition(CheckoutState::Submitting);
        let request = self.payment_request(form, &snapshot);

        let receipt = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(checkout_id = %self.id, "checkout cancelled during payment");
                self.transition(CheckoutState::Idle);
                return Err(CommerceError::Cancelled);
            }
            receipt = self.gateway.charge(&request) => receipt,
        };

        cart.clear();
        let confirmation = OrderConfirmation::new(self.id.clone(), form, snapshot, receipt);
        info!(
            checkout_id = %self.id,
            order_id = %confirmation.order_id,
            items = confirmation.item_count,
            subtotal = %confirmation.subtotal,
            "order placed"
        );
        self.confirm(confirmation.clone());
        Ok(confirmation)
    }

    fn payment_request(&self, form: &OrderForm, cart: &CartSummary) -> PaymentRequest {
        PaymentRequest {
            checkout_id: self.id.clone(),
            amount: cart.subtotal,
            customer_email: form.email.trim().to_string(),
            lines: cart.lines.iter().map(|l| l.line_id.clone()).collect(),
        }
    }

    /// Claim the workflow for one submission.
    fn begin(&self) -> Result<(), CommerceError> {
        let mut inner = self.lock();
        let claimed = match &inner.state {
            CheckoutState::Idle | CheckoutState::Failed(_) => Ok(()),
            CheckoutState::Validating | CheckoutState::Submitting => {
                Err(CommerceError::AlreadyInProgress)
            }
            CheckoutState::Confirmed => Err(CommerceError::AlreadyConfirmed),
        };
        if claimed.is_ok() {
            self.set_state(&mut inner, CheckoutState::Validating);
        }
        claimed
    }

    fn fail(&self, reason: CommerceError) {
        warn!(checkout_id = %self.id, error = %reason, code = reason.code(), "checkout validation failed");
        let mut inner = self.lock();
        inner.last_error = Some(reason.clone());
        self.set_state(&mut inner, CheckoutState::Failed(reason));
        self.set_state(&mut inner, CheckoutState::Idle);
    }

    fn confirm(&self, confirmation: OrderConfirmation) {
        let mut inner = self.lock();
        inner.confirmation = Some(confirmation);
        inner.last_error = None;
        self.set_state(&mut inner, CheckoutState::Confirmed);
    }

    fn transition(&self, to: CheckoutState) {
        let mut inner = self.lock();
        self.set_state(&mut inner, to);
    }

    fn set_state(&self, inner: &mut Inner, to: CheckoutState) {
        let from = std::mem::replace(&mut inner.state, to.clone());
        info!(checkout_id = %self.id, from = from.as_str(), to = to.as_str(), "checkout state changed");
        // No subscribers is fine.
        let _ = self.transitions.send(StateTransition { from, to });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CheckoutWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CheckoutWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutWorkflow")
            .field("id", &self.id)
            .field("gateway", &self.gateway.name())
            .field("state", &self.state())
            .finish()
    }
}

/// Returns an abandoned submission to `Idle`.
///
/// Covers the submit future being dropped mid-flight; every other exit has
/// already left the workflow idle or confirmed.
struct SubmissionGuard<'a> {
    workflow: &'a CheckoutWorkflow,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.workflow.lock();
        if inner.state.is_busy() {
            warn!(checkout_id = %self.workflow.id, "checkout submission dropped before completion");
            self.workflow.set_state(&mut inner, CheckoutState::Idle);
        }
    }
}
