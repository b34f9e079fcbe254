//! # offerbook-core
//!
//! **Sorted offer chains with O(1) threshold matching.**
//!
//! Each category keeps its live offers in an ascending doubly-linked chain
//! with cached floor and ceiling. It has:
//!
//! - **O(1) matching**: only the ceiling can clear a minimum amount
//! - **FIFO tie-break**: among equal amounts the earliest offer matches first
//! - **Atomic mutations**: every operation validates before its first write
//! - **Category sharding**: each category has its own independent lock

pub mod allocator;
pub mod book;
pub mod digest;
pub mod engine;
pub mod index;
pub mod invariants;

pub use allocator::IdAllocator;
pub use book::{CategoryBook, Chain, Placement, Relocation};
pub use digest::{chain_digest, digest_hex, verify_chain_digest};
pub use engine::OfferEngine;
pub use index::{CategoryIndex, Extreme};
pub use invariants::verify;
