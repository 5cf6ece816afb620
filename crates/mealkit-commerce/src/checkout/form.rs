//! Contact and delivery form.

use crate::error::CommerceError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// `local@domain.tld`, ASCII only, final label at least two letters.
const EMAIL_PATTERN: &str = r"(?i)^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$";

/// Customer details collected at checkout. Free text until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderForm {
    pub full_name: String,
    pub email: String,
    /// Delivery address, possibly multi-line.
    pub address: String,
}

impl OrderForm {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            address: address.into(),
        }
    }

    /// Validate the fields in a fixed order: name, email, address.
    ///
    /// Only the first failing field is reported.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if is_blank(&self.full_name) {
            return Err(CommerceError::MissingName);
        }
        if !is_valid_email(&self.email) {
            return Err(CommerceError::InvalidEmail);
        }
        if is_blank(&self.address) {
            return Err(CommerceError::MissingAddress);
        }
        Ok(())
    }
}

/// Check an email address against the accepted pattern.
///
/// Surrounding whitespace is ignored.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
        .is_match(email.trim())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
