//! CLI command implementations.

pub mod catalog;
pub mod checkout;
pub mod config;

use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show meals with this tag (e.g., keto, high-protein).
    #[arg(short, long)]
    pub tag: Option<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Meal to order, as `id` or `id:quantity`. Repeatable.
    #[arg(short, long = "item", value_name = "ID[:QTY]")]
    pub item: Vec<String>,

    /// Full name for the order.
    #[arg(long)]
    pub name: Option<String>,

    /// Email for the receipt.
    #[arg(long)]
    pub email: Option<String>,

    /// Delivery address.
    #[arg(long)]
    pub address: Option<String>,

    /// Skip prompts and the confirmation step.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
