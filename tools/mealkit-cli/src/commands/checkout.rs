//! Build a cart and place an order.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Input};
use mealkit_commerce::cart::{CartHandle, CartSummary};
use mealkit_commerce::checkout::{
    CancelToken, CheckoutWorkflow, OrderConfirmation, OrderForm, SimulatedGateway,
};
use mealkit_commerce::CommerceError;

use super::CheckoutArgs;
use crate::context::Context;
use crate::output::{state_badge, state_message};

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.config.build_catalog()?;
    let cart = ctx.new_cart()?;

    for spec in &args.item {
        let (id, quantity) = parse_item_spec(spec)?;
        let item = catalog
            .get(&id.into())
            .with_context(|| format!("Unknown meal: {}", id))?;
        cart.add(item.clone(), quantity)
            .with_context(|| format!("Could not add {} x {}", quantity, item.name))?;
    }

    let interactive = !args.yes && !ctx.output.is_json() && console::user_attended();

    if !ctx.output.is_json() {
        print_summary(ctx, &cart.summary());
    }

    let form = OrderForm::new(
        field(args.name, "Full name", interactive)?,
        field(args.email, "Email", interactive)?,
        field(args.address, "Delivery address", interactive)?,
    );

    if interactive && !cart.is_empty() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", cart.subtotal().display()))
            .default(true)
            .interact()?;

        if !confirmed {
            ctx.output.info("Checkout cancelled");
            return Ok(());
        }
    }

    let gateway = SimulatedGateway::new(ctx.config.payment_latency());
    let workflow = CheckoutWorkflow::with_gateway(Arc::new(gateway));
    ctx.output.debug(&format!("Checkout {}", workflow.id()));

    match submit_with_progress(ctx, &workflow, &cart, &form).await {
        Ok(confirmation) => {
            print_confirmation(ctx, &confirmation);
            Ok(())
        }
        Err(CommerceError::Cancelled) => {
            ctx.output
                .warn("Checkout cancelled before payment completed. Nothing was charged.");
            Ok(())
        }
        Err(e) => {
            ctx.output
                .debug(&format!("Checkout ended in {}", state_badge(&workflow.state())));
            Err(e.into())
        }
    }
}

/// Run `submit` with a spinner that follows the workflow's state, cancelling
/// the payment step on Ctrl-C.
async fn submit_with_progress(
    ctx: &Context,
    workflow: &CheckoutWorkflow,
    cart: &CartHandle,
    form: &OrderForm,
) -> Result<OrderConfirmation, CommerceError> {
    let spinner = ctx.output.spinner(state_message(&workflow.state()));

    let mut transitions = workflow.subscribe();
    let progress = spinner.clone();
    let watcher = tokio::spawn(async move {
        while let Ok(transition) = transitions.recv().await {
            tracing::debug!(
                from = transition.from.as_str(),
                to = transition.to.as_str(),
                "checkout transition"
            );
            progress.set_message(state_message(&transition.to));
        }
    });

    let cancel = CancelToken::new();
    let submit = workflow.submit(cart, form, &cancel);
    tokio::pin!(submit);

    let mut listening = true;
    let result = loop {
        tokio::select! {
            result = &mut submit => break result,
            signal = tokio::signal::ctrl_c(), if listening => {
                listening = false;
                if signal.is_ok() {
                    spinner.set_message("Cancelling");
                    cancel.cancel();
                }
            }
        }
    };

    watcher.abort();
    spinner.finish_and_clear();
    result
}

/// Use the flag value, prompt for it, or fall back to empty and let the
/// workflow report what is missing.
fn field(value: Option<String>, prompt: &str, interactive: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None if interactive => Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
        None => Ok(String::new()),
    }
}

/// Parse `id` or `id:quantity`.
fn parse_item_spec(spec: &str) -> Result<(&str, i64)> {
    let (id, quantity) = match spec.rsplit_once(':') {
        Some((id, qty)) => {
            let quantity = qty
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid quantity in '{}'", spec))?;
            (id.trim(), quantity)
        }
        None => (spec.trim(), 1),
    };

    if id.is_empty() {
        bail!("Missing meal id in '{}'", spec);
    }
    Ok((id, quantity))
}

fn print_summary(ctx: &Context, summary: &CartSummary) {
    ctx.output.header("Your cart");

    if summary.is_empty() {
        ctx.output.info("Your cart is empty.");
        return;
    }

    let widths = [30, 5, 10];
    for line in &summary.lines {
        ctx.output.table_row(
            &[
                &line.name,
                &format!("x{}", line.quantity),
                &line.line_total.display(),
            ],
            &widths,
        );
    }
    ctx.output.kv("Items", &summary.item_count.to_string());
    ctx.output.kv("Subtotal", &summary.subtotal.display());
}

fn print_confirmation(ctx: &Context, confirmation: &OrderConfirmation) {
    if ctx.output.is_json() {
        ctx.output.json(confirmation);
        return;
    }

    ctx.output.success(&confirmation.message());
    ctx.output.kv("Order", confirmation.order_id.as_str());
    ctx.output.kv("Items", &confirmation.item_count.to_string());
    ctx.output.kv("Charged", &confirmation.receipt.amount.display());
    ctx.output.kv("Receipt", &confirmation.receipt.reference);
    ctx.output.kv("Deliver to", &confirmation.address);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_spec() {
        assert_eq!(parse_item_spec("keto-caesar").unwrap(), ("keto-caesar", 1));
        assert_eq!(parse_item_spec("tuna-poke:3").unwrap(), ("tuna-poke", 3));
        assert_eq!(parse_item_spec("tuna-poke:0").unwrap(), ("tuna-poke", 0));
    }

    #[test]
    fn test_parse_item_spec_rejects_garbage() {
        assert!(parse_item_spec("tuna-poke:lots").is_err());
        assert!(parse_item_spec(":2").is_err());
    }

    #[test]
    fn test_field_without_prompt() {
        assert_eq!(field(Some("Alice".into()), "Name", false).unwrap(), "Alice");
        assert_eq!(field(None, "Name", false).unwrap(), "");
    }
}
