//! The seams between the desk and the outside world.
//!
//! The desk never decides who may touch an offer, never holds funds, and
//! never delivers notifications itself. Each of those is a trait here, with
//! small stock implementations for tests and embedding.

use offerbook_types::{MakerId, Offer, OfferbookError, Result};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::events::OfferEvent;

/// Decides whether `caller` may revise or cancel `offer`.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: MakerId, offer: &Offer) -> Result<()>;
}

/// Holds the funds that back live offers.
///
/// Each call either moves the whole amount or fails with nothing moved.
pub trait FundsCustodian: Send + Sync {
    /// Lock `amount` of `maker`'s funds behind an offer.
    fn escrow(&self, maker: MakerId, amount: Decimal) -> Result<()>;

    /// Return `amount` of escrow to `maker`.
    fn refund(&self, maker: MakerId, amount: Decimal) -> Result<()>;

    /// Pay `amount` of `maker`'s escrow out to `seller`.
    fn release_to_seller(&self, maker: MakerId, seller: MakerId, amount: Decimal) -> Result<()>;
}

/// Receives every committed [`OfferEvent`].
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OfferEvent);
}

// =====================================================================
// Stock implementations
// =====================================================================

/// Lets anyone mutate any offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _caller: MakerId, _offer: &Offer) -> Result<()> {
        Ok(())
    }
}

/// Only the offer's maker may mutate it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakerOnly;

impl Authorizer for MakerOnly {
    fn authorize(&self, caller: MakerId, offer: &Offer) -> Result<()> {
        if caller == offer.maker {
            Ok(())
        } else {
            Err(OfferbookError::Unauthorized {
                caller,
                id: offer.id,
            })
        }
    }
}

/// Logs each event at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: OfferEvent) {
        tracing::info!(
            kind = event.kind(),
            category = %event.category(),
            offer_id = %event.offer_id(),
            "Offer event"
        );
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<OfferEvent>>,
}

impl RecordingEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<OfferEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<OfferEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: OfferEvent) {
        self.events.lock().push(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn emit(&self, event: OfferEvent) {
        (**self).emit(event);
    }
}

impl<T: FundsCustodian + ?Sized> FundsCustodian for std::sync::Arc<T> {
    fn escrow(&self, maker: MakerId, amount: Decimal) -> Result<()> {
        (**self).escrow(maker, amount)
    }

    fn refund(&self, maker: MakerId, amount: Decimal) -> Result<()> {
        (**self).refund(maker, amount)
    }

    fn release_to_seller(&self, maker: MakerId, seller: MakerId, amount: Decimal) -> Result<()> {
        (**self).release_to_seller(maker, seller, amount)
    }
}
