//! # Money — Decimal-String Monetary Values
//!
//! The estimated value of a disputed item is stored as a decimal string
//! with a currency code. Amounts are never floats: an item snapshot taken
//! at dispute creation must reproduce byte-identically on round-trip, and
//! floating-point serialization cannot guarantee that.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Monetary amount with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount as a decimal string (e.g., "1200", "349.99").
    pub amount: String,
    /// ISO 4217 currency code (e.g., "USD", "EUR").
    pub currency: String,
}

impl Money {
    /// Create a new monetary amount.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] if the amount string is empty
    /// or contains non-decimal characters.
    pub fn new(amount: impl Into<String>, currency: impl Into<String>) -> Result<Self, CoreError> {
        let amount = amount.into();
        if !is_valid_decimal(&amount) {
            return Err(CoreError::InvalidAmount(amount));
        }
        Ok(Self {
            amount,
            currency: currency.into(),
        })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// Validate that a string represents a valid decimal number.
fn is_valid_decimal(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return false;
    }
    let mut has_dot = false;
    let mut has_digit = false;
    for c in s.chars() {
        if c == '.' {
            if has_dot {
                return false;
            }
            has_dot = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else {
            return false;
        }
    }
    has_digit
}
