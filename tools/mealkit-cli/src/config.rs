//! CLI configuration.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use mealkit_commerce::catalog::{Catalog, Item, Nutrition};
use mealkit_commerce::{Currency, Money, MAX_PER_ITEM};
use serde::{Deserialize, Serialize};

/// Highest unit price accepted from config, in major units.
pub const MAX_PRICE: f64 = 100_000.0;

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Store-wide settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Checkout settings.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Items for sale.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Resolve the configured currency.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.store.currency)
            .with_context(|| format!("Unknown currency: {}", self.store.currency))
    }

    /// Simulated payment latency.
    pub fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.checkout.payment_latency_ms)
    }

    /// Build the catalog, priced in the store currency.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let report = self.validate();
        if let Some(first) = report.errors.first() {
            bail!("Invalid configuration: {}", first);
        }

        let currency = self.currency()?;
        Ok(self
            .catalog
            .items
            .iter()
            .map(|entry| entry.to_item(currency))
            .collect())
    }

    /// Check the config for errors and suspicious values.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if Currency::from_code(&self.store.currency).is_none() {
            report
                .errors
                .push(format!("store.currency '{}' is not supported", self.store.currency));
        }
        if self.store.max_per_item < 1 {
            report
                .errors
                .push("store.max_per_item must be at least 1".to_string());
        }

        if self.catalog.items.is_empty() {
            report
                .warnings
                .push("catalog has no items; run `mealkit config init`".to_string());
        }

        let mut seen = HashSet::new();
        for (i, item) in self.catalog.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                report.errors.push(format!("catalog.items[{}].id is required", i));
            } else if !seen.insert(item.id.as_str()) {
                report
                    .errors
                    .push(format!("catalog.items[{}].id '{}' is duplicated", i, item.id));
            }
            if item.name.trim().is_empty() {
                report.errors.push(format!("catalog.items[{}].name is required", i));
            }
            if !item.price.is_finite() || item.price < 0.0 {
                report
                    .errors
                    .push(format!("catalog.items[{}].price must be zero or more", i));
            } else if item.price > MAX_PRICE {
                report.errors.push(format!(
                    "catalog.items[{}].price must be at most {}",
                    i, MAX_PRICE
                ));
            }
        }

        if self.checkout.payment_latency_ms > 30_000 {
            report.warnings.push(format!(
                "checkout.payment_latency_ms = {} is unusually long",
                self.checkout.payment_latency_ms
            ));
        }

        report
    }
}

/// Result of [`CliConfig::validate`].
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Store-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// ISO currency code for all prices (default: AUD).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Most units of one item a cart may hold (default: 20).
    #[serde(default = "default_max_per_item")]
    pub max_per_item: i64,
}

fn default_currency() -> String {
    Currency::default().code().to_string()
}

fn default_max_per_item() -> i64 {
    MAX_PER_ITEM
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            max_per_item: default_max_per_item(),
        }
    }
}

/// Checkout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Simulated payment delay in milliseconds (default: 1200).
    #[serde(default = "default_payment_latency_ms")]
    pub payment_latency_ms: u64,
}

fn default_payment_latency_ms() -> u64 {
    1200
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_latency_ms: default_payment_latency_ms(),
        }
    }
}

/// Catalog section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub items: Vec<CatalogItemConfig>,
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItemConfig {
    pub id: String,
    pub name: String,

    /// Unit price as a decimal (e.g., 12.99).
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<u32>,
}

impl CatalogItemConfig {
    fn to_item(&self, currency: Currency) -> Item {
        let mut item = Item::new(
            self.id.as_str(),
            self.name.clone(),
            Money::from_decimal(self.price, currency),
        )
        .with_tags(self.tags.iter().cloned());
        item.image = self.image.clone();

        if let Some(calories) = self.calories {
            item = item.with_nutrition(Nutrition {
                calories,
                protein: self.protein.unwrap_or(0),
                carbs: self.carbs.unwrap_or(0),
                fat: self.fat.unwrap_or(0),
            });
        }
        item
    }
}

/// Whether `path` names a JSON config file.
pub fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Default config rendered for `path`: JSON for `.json`, TOML otherwise.
pub fn default_config_for(path: &Path) -> Result<String> {
    let toml = generate_default_config();
    if !is_json(path) {
        return Ok(toml);
    }
    let config: CliConfig = toml::from_str(&toml).context("Default config is not valid TOML")?;
    serde_json::to_string_pretty(&config).context("Failed to render default config as JSON")
}

/// Generate a default mealkit.toml config file.
pub fn generate_default_config() -> String {
    r#"# MealKit storefront configuration

[store]
currency = "AUD"
max_per_item = 20

[checkout]
# Simulated payment gateway delay.
payment_latency_ms = 1200

[[catalog.items]]
id = "keto-caesar"
name = "Keto Chicken Caesar Bowl"
price = 12.99
image = "KetoCaesarBowl"
tags = ["keto", "gluten-free"]
calories = 520
protein = 42
carbs = 9
fat = 35

[[catalog.items]]
id = "zucchini-pesto"
name = "Zucchini Noodles & Pesto"
price = 11.49
image = "ZucchiniNoodles"
tags = ["keto", "vegetarian"]
calories = 480
protein = 18
carbs = 11
fat = 38

[[catalog.items]]
id = "salmon-avocado"
name = "Salmon & Avocado Salad"
price = 14.49
image = "Salmonavocadosalad"
tags = ["keto", "pescatarian"]
calories = 510
protein = 34
carbs = 8
fat = 38

[[catalog.items]]
id = "teriyaki-bowl"
name = "Teriyaki Chicken Power Bowl"
price = 12.49
image = "TerayakiChickenPowerBowl"
tags = ["high-protein"]
calories = 620
protein = 50
carbs = 55
fat = 18

[[catalog.items]]
id = "tuna-poke"
name = "Tuna Poke Bowl"
price = 13.49
image = "Tunapokebowl"
tags = ["high-protein", "pescatarian"]
calories = 540
protein = 46
carbs = 52
fat = 12

[[catalog.items]]
id = "yoghurt-parfait"
name = "Greek Yoghurt Parfait"
price = 8.99
image = "Greekyogurtparfait"
tags = ["high-protein", "vegetarian"]
calories = 420
protein = 32
carbs = 44
fat = 10
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        let report = config.validate();
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.with_tag("keto").count(), 3);

        let caesar = &catalog.items()[0];
        assert_eq!(caesar.price, Money::new(1299, Currency::AUD));
        assert_eq!(caesar.nutrition.map(|n| n.protein), Some(42));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.store.currency, "AUD");
        assert_eq!(config.store.max_per_item, MAX_PER_ITEM);
        assert_eq!(config.payment_latency(), Duration::from_millis(1200));
        assert!(config.validate().errors.is_empty());
        assert_eq!(config.validate().warnings.len(), 1);
    }

    #[test]
    fn test_validate_reports_bad_entries() {
        let config: CliConfig = toml::from_str(
            r#"
            [store]
            currency = "XYZ"
            max_per_item = 0

            [[catalog.items]]
            id = "a"
            name = "A"
            price = -1.0

            [[catalog.items]]
            id = "a"
            name = ""
            price = 2.0
            "#,
        )
        .unwrap();

        let report = config.validate();
        assert_eq!(report.errors.len(), 5, "{:?}", report.errors);
        assert!(config.build_catalog().is_err());
    }

    #[test]
    fn test_validate_caps_price() {
        let config: CliConfig = toml::from_str(
            r#"
            [[catalog.items]]
            id = "gold"
            name = "Gold Leaf Bowl"
            price = 1e30
            "#,
        )
        .unwrap();

        let report = config.validate();
        assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
        assert!(report.errors[0].contains("at most"));
        assert!(config.build_catalog().is_err());
    }

    #[test]
    fn test_default_config_as_json() {
        let json = default_config_for(Path::new("shop/mealkit.json")).unwrap();
        let config: CliConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.catalog.items.len(), 6);

        let toml = default_config_for(Path::new("mealkit.toml")).unwrap();
        assert_eq!(toml, generate_default_config());
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mealkit.json");
        std::fs::write(
            &path,
            r#"{"store": {"currency": "NZD"}, "catalog": {"items": [{"id": "x", "name": "X", "price": 5.5}]}}"#,
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.currency().unwrap(), Currency::NZD);
        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.items()[0].price, Money::new(550, Currency::NZD));
    }
}
