//! Offer id allocation.
//!
//! One allocator per engine instance. Ids start at
//! [`FIRST_OFFER_ID`](offerbook_types::constants::FIRST_OFFER_ID), increase
//! strictly, and are never handed out twice, even once every offer has been
//! removed. `0` is never produced.

use std::sync::atomic::{AtomicU64, Ordering};

use offerbook_types::{OfferId, constants};

/// Monotonic offer id source, safe to share across threads.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(constants::FIRST_OFFER_ID),
        }
    }

    /// Issue the next id.
    pub fn next_id(&self) -> OfferId {
        OfferId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
