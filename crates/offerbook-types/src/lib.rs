//! # offerbook-types
//!
//! Shared types, errors, and configuration for the **offerbook** engine.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`MakerId`], [`CategoryKey`]
//! - **Offer model**: [`Offer`]
//! - **Configuration**: [`EngineConfig`], [`LogConfig`], [`LogFormat`]
//! - **Errors**: [`OfferbookError`] with `OB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;

// Re-export all primary types at crate root for ergonomic imports:
//   use offerbook_types::{Offer, OfferId, CategoryKey, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;

// Constants are accessed via `offerbook_types::constants::FOO`
// (not re-exported to avoid name collisions).
