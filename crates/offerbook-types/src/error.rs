//! Error types for the offerbook engine.
//!
//! All errors use the `OB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer errors
//! - 2xx: Chain integrity errors
//! - 3xx: Collaborator (authorization / custody) errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{CategoryKey, MakerId, OfferId};

/// Central error enum for all offerbook operations.
#[derive(Debug, Error)]
pub enum OfferbookError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// No live offer with this id exists in the category.
    #[error("OB_ERR_100: Offer {id} not found in category {category}")]
    OfferNotFound { category: CategoryKey, id: OfferId },

    /// No offer in the category clears the requested minimum.
    #[error("OB_ERR_101: No offer in {category} clears {min_amount}")]
    NoMatchingOffer {
        category: CategoryKey,
        min_amount: Decimal,
    },

    /// The amount cannot back an offer (negative, or out of range for the
    /// requested change).
    #[error("OB_ERR_102: Invalid offer amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    // =================================================================
    // Chain Integrity Errors (2xx)
    // =================================================================
    /// A sorted-chain invariant was found broken. Always a logic bug.
    #[error("OB_ERR_200: Invariant violation in {category}: {reason}")]
    InvariantViolation {
        category: CategoryKey,
        reason: String,
    },

    // =================================================================
    // Collaborator Errors (3xx)
    // =================================================================
    /// The caller may not mutate this offer.
    #[error("OB_ERR_300: {caller} is not authorized to modify {id}")]
    Unauthorized { caller: MakerId, id: OfferId },

    /// The maker cannot cover the escrow required for this operation.
    #[error("OB_ERR_301: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// The custodian failed to move funds.
    #[error("OB_ERR_302: Custody failed: {reason}")]
    CustodyFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("OB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config document, bad values, etc.).
    #[error("OB_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl OfferbookError {
    /// Whether this error indicates corrupted engine state rather than a
    /// recoverable caller-facing condition.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OfferbookError>;

impl From<serde_json::Error> for OfferbookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
