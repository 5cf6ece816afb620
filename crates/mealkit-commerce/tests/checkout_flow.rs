//! End-to-end checkout scenarios against a shared cart.

use mealkit_commerce::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn bowl() -> Item {
    Item::new("caesar", "Keto Chicken Caesar Bowl", Money::from_decimal(12.99, Currency::AUD))
        .with_tags(["keto", "gluten-free"])
}

fn cart_with_two_bowls() -> CartHandle {
    let cart = CartHandle::default();
    cart.add(bowl(), 2).unwrap();
    cart
}

#[tokio::test(start_paused = true)]
async fn empty_cart_is_reported_before_form_errors() {
    let cart = CartHandle::default();
    let workflow = CheckoutWorkflow::new();
    let form = OrderForm::new("", "nope", "");

    let result = workflow.submit(&cart, &form, &CancelToken::new()).await;

    assert_eq!(result, Err(CommerceError::CartIsEmpty));
    assert_eq!(workflow.state(), CheckoutState::Idle);
}

#[tokio::test(start_paused = true)]
async fn name_is_checked_before_email() {
    let cart = cart_with_two_bowls();
    let workflow = CheckoutWorkflow::new();
    let form = OrderForm::new("   ", "not-an-email", "1 Main St");

    let result = workflow.submit(&cart, &form, &CancelToken::new()).await;

    assert_eq!(result, Err(CommerceError::MissingName));
    assert_eq!(cart.item_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn successful_checkout_clears_cart_and_confirms() {
    let cart = cart_with_two_bowls();
    let workflow = CheckoutWorkflow::new();
    let mut transitions = workflow.subscribe();
    let form = OrderForm::new("Alice", "a@b.com", "1 Main St");

    let started = tokio::time::Instant::now();
    let confirmation = workflow
        .submit(&cart, &form, &CancelToken::new())
        .await
        .unwrap();

    assert!(started.elapsed() >= DEFAULT_PAYMENT_LATENCY);
    assert!(cart.is_empty());
    assert_eq!(cart.item_count(), 0);
    assert_eq!(workflow.state(), CheckoutState::Confirmed);
    assert_eq!(confirmation.customer_name, "Alice");
    assert!(confirmation.message().contains("Alice"));
    assert_eq!(confirmation.subtotal.display(), "A$25.98");
    assert_eq!(confirmation.lines.len(), 1);
    assert_eq!(confirmation.receipt.amount, confirmation.subtotal);

    let mut states = Vec::new();
    while let Ok(t) = transitions.try_recv() {
        states.push(t.to);
    }
    assert_eq!(
        states,
        vec![
            CheckoutState::Validating,
            CheckoutState::Submitting,
            CheckoutState::Confirmed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_email_keeps_cart_and_returns_to_idle() {
    let cart = cart_with_two_bowls();
    let before = cart.lines();
    let workflow = CheckoutWorkflow::new();
    let form = OrderForm::new("Alice", "not-an-email", "1 Main St");

    let started = tokio::time::Instant::now();
    let result = workflow.submit(&cart, &form, &CancelToken::new()).await;

    assert_eq!(result, Err(CommerceError::InvalidEmail));
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(cart.lines(), before);
    assert_eq!(workflow.state(), CheckoutState::Idle);
}

#[tokio::test(start_paused = true)]
async fn cart_events_follow_checkout() {
    let cart = cart_with_two_bowls();
    let mut events = cart.subscribe();
    let workflow = CheckoutWorkflow::new();

    workflow
        .submit(
            &cart,
            &OrderForm::new("Alice", "a@b.com", "1 Main St"),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(events.recv().await, Some(CartEvent::Cleared { lines_removed: 1 }));
}

struct InstantGateway;

#[async_trait::async_trait]
impl PaymentGateway for InstantGateway {
    fn name(&self) -> &str {
        "instant"
    }

    async fn charge(&self, request: &PaymentRequest) -> PaymentReceipt {
        PaymentReceipt {
            reference: format!("inst-{}", request.checkout_id),
            amount: request.amount,
            gateway: self.name().to_string(),
        }
    }
}

#[tokio::test]
async fn custom_gateway_is_used() {
    let cart = cart_with_two_bowls();
    let workflow = CheckoutWorkflow::with_gateway(Arc::new(InstantGateway));

    let confirmation = workflow
        .submit(
            &cart,
            &OrderForm::new("Alice", "a@b.com", "1 Main St"),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(confirmation.receipt.gateway, "instant");
    assert_eq!(
        confirmation.receipt.reference,
        format!("inst-{}", workflow.id())
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_before_submit_still_validates_first() {
    let cart = cart_with_two_bowls();
    let workflow = CheckoutWorkflow::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let bad = OrderForm::new("Alice", "a@b.com", "");
    assert_eq!(
        workflow.submit(&cart, &bad, &cancel).await,
        Err(CommerceError::MissingAddress)
    );

    let good = OrderForm::new("Alice", "a@b.com", "1 Main St");
    assert_eq!(
        workflow.submit(&cart, &good, &cancel).await,
        Err(CommerceError::Cancelled)
    );
    assert_eq!(cart.item_count(), 2);
    assert_eq!(workflow.state(), CheckoutState::Idle);
}
