//! Catalog item types.

use crate::ids::ItemId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A sellable item supplied by the catalog.
///
/// The cart holds its own copy of the item; nothing in the cart or checkout
/// modifies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Stable catalog identifier.
    pub id: ItemId,
    /// Display name (e.g., "Keto Chicken Caesar Bowl").
    pub name: String,
    /// Unit price. The cart refuses items priced below zero.
    pub price: Money,
    /// Image asset name for presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Nutrition facts per serving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    /// Free-form tags: "keto", "vegetarian", "high-protein", ...
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Create an item with no image, nutrition or tags.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: None,
            nutrition: None,
            tags: Vec::new(),
        }
    }

    pub fn with_nutrition(mut self, nutrition: Nutrition) -> Self {
        self.nutrition = Some(nutrition);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Check for a tag, ignoring ASCII case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Approximate nutrition facts for one serving.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Nutrition {
    pub calories: u32,
    /// Grams of protein.
    pub protein: u32,
    /// Grams of carbohydrate.
    pub carbs: u32,
    /// Grams of fat.
    pub fat: u32,
}
