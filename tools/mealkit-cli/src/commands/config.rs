//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{default_config_for, ValidationReport};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if let Some(e) = &ctx.load_error {
        bail!("{:#}", e);
    }

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "built-in defaults"),
    }

    ctx.output.info("[store]");
    ctx.output.kv("currency", &ctx.config.store.currency);
    ctx.output
        .kv("max_per_item", &ctx.config.store.max_per_item.to_string());

    ctx.output.info("[checkout]");
    ctx.output.kv(
        "payment_latency_ms",
        &ctx.config.checkout.payment_latency_ms.to_string(),
    );

    ctx.output
        .info(&format!("[catalog] {} item(s)", ctx.config.catalog.items.len()));
    for item in &ctx.config.catalog.items {
        ctx.output
            .list_item(&format!("{} ({}) {:.2}", item.name, item.id, item.price));
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.init_target();

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let content = default_config_for(&config_path)?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    let report = match &ctx.load_error {
        Some(e) => ValidationReport {
            errors: vec![format!("{:#}", e)],
            warnings: Vec::new(),
        },
        None => ctx.config.validate(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else {
        ctx.output.header("Validating configuration");
    }

    for error in &report.errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &report.warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !report.errors.is_empty() {
        bail!("Configuration has {} error(s)", report.errors.len());
    }

    if report.warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
