//! # offerbook-desk
//!
//! **Offer lifecycle around the engine**: authorization, escrow custody,
//! event emission, and tracing setup.
//!
//! ## Architecture
//!
//! The desk sits between callers and the [`OfferEngine`](offerbook_core::OfferEngine):
//! 1. **Authorizer**: may this caller revise or cancel this offer
//! 2. **FundsCustodian**: escrows on place/increase, refunds on
//!    decrease/cancel, pays the seller on fill
//! 3. **EventSink**: receives an [`OfferEvent`] per committed change
//! 4. **Telemetry**: installs the `tracing` subscriber from [`LogConfig`](offerbook_types::LogConfig)
//!
//! ## Offer Flow
//!
//! ```text
//! Caller -> OfferDesk -> Authorizer / FundsCustodian -> OfferEngine -> EventSink
//! ```
//!
//! A collaborator rejection aborts the operation before the chain changes.

pub mod collaborators;
pub mod desk;
pub mod events;
pub mod ledger;
pub mod telemetry;

pub use collaborators::{
    AllowAll, Authorizer, EventSink, FundsCustodian, MakerOnly, RecordingEventSink,
    TracingEventSink,
};
pub use desk::OfferDesk;
pub use events::OfferEvent;
pub use ledger::{Account, LedgerCustodian};
pub use telemetry::init_tracing;
