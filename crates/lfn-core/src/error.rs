//! # Core Error Types
//!
//! Validation errors raised by the foundational value types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Errors raised when constructing core value types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier string was empty or otherwise malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp string could not be parsed or used a non-UTC offset.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A trust score was outside the 0–100 range.
    #[error("trust score out of range (0-100): {0}")]
    TrustScoreOutOfRange(u16),

    /// A monetary amount string was empty or contained non-decimal characters.
    #[error("invalid monetary amount: {0:?}")]
    InvalidAmount(String),
}
