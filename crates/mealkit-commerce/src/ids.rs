//! Newtype IDs for type-safe identifiers.
//!
//! Line ids and item ids are both strings on the wire; the newtypes keep a
//! `LineId` from being passed where an `ItemId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ItemId, "item");
define_id!(LineId, "line");
define_id!(CheckoutId, "chk");
define_id!(OrderId, "ord");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ItemId::new("keto-caesar");
        assert_eq!(id.as_str(), "keto-caesar");
    }

    #[test]
    fn test_id_generation() {
        let id1 = LineId::generate();
        let id2 = LineId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("line_"));
    }

    #[test]
    fn test_id_from_string() {
        let id: ItemId = "tuna-poke".into();
        assert_eq!(format!("{}", id), "tuna-poke");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = OrderId::new("ord_1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ord_1\"");
    }
}
