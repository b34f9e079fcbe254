//! The offer desk: engine operations wrapped with authorization, custody,
//! and event emission.
//!
//! ## Offer Flow
//!
//! ```text
//! place  : escrow(amount)            -> add_offer       -> Created
//! revise : authorize -> escrow/refund(delta) -> update  -> Updated
//! cancel : authorize -> refund(amount)       -> remove  -> Cancelled
//! fill   : match ceiling >= min -> release_to_seller -> remove -> Filled
//! ```
//!
//! Collaborator checks for revise, cancel, and fill run under the category
//! lock, before the chain is touched. A rejection leaves both the chain and
//! the funds as they were.

use std::sync::Arc;

use offerbook_core::{OfferEngine, Relocation};
use offerbook_types::{CategoryKey, MakerId, Offer, OfferId, OfferbookError, Result};
use rust_decimal::Decimal;

use crate::collaborators::{Authorizer, EventSink, FundsCustodian};
use crate::events::OfferEvent;

/// Offer lifecycle front-end over a shared [`OfferEngine`].
pub struct OfferDesk<A, F, E> {
    engine: Arc<OfferEngine>,
    authorizer: A,
    custodian: F,
    events: E,
}

impl<A, F, E> OfferDesk<A, F, E>
where
    A: Authorizer,
    F: FundsCustodian,
    E: EventSink,
{
    #[must_use]
    pub fn new(engine: Arc<OfferEngine>, authorizer: A, custodian: F, events: E) -> Self {
        Self {
            engine,
            authorizer,
            custodian,
            events,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<OfferEngine> {
        &self.engine
    }

    #[must_use]
    pub fn custodian(&self) -> &F {
        &self.custodian
    }

    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Escrow `amount` from `maker` and place the offer.
    pub fn place(&self, category: &CategoryKey, maker: MakerId, amount: Decimal) -> Result<OfferId> {
        check_amount(amount)
            .and_then(|()| self.custodian.escrow(maker, amount))
            .inspect_err(|e| rejected("place", category, None, e))?;

        let id = match self.engine.add_offer(category, amount, maker) {
            Ok(id) => id,
            Err(err) => {
                compensate(|| self.custodian.refund(maker, amount));
                return Err(err);
            }
        };

        self.events.emit(OfferEvent::Created {
            category: category.clone(),
            id,
            maker,
            amount,
        });
        Ok(id)
    }

    /// Change an offer's amount on behalf of `caller`.
    ///
    /// An increase escrows the difference from the maker; a decrease refunds
    /// it. An unchanged amount moves no funds and emits nothing. Negative
    /// amounts are rejected before the offer is looked up.
    pub fn revise(
        &self,
        caller: MakerId,
        category: &CategoryKey,
        id: OfferId,
        new_amount: Decimal,
    ) -> Result<Relocation> {
        check_amount(new_amount).inspect_err(|e| rejected("revise", category, Some(id), e))?;
        let mut moved: Option<(MakerId, Decimal, Decimal)> = None;

        let outcome = self
            .engine
            .update_offer_guarded(category, id, new_amount, |offer| {
                self.authorizer.authorize(caller, offer)?;
                let delta = new_amount.checked_sub(offer.amount).ok_or_else(|| {
                    OfferbookError::InvalidAmount {
                        amount: new_amount,
                        reason: format!("change from {} overflows", offer.amount),
                    }
                })?;
                if delta > Decimal::ZERO {
                    self.custodian.escrow(offer.maker, delta)?;
                } else if delta < Decimal::ZERO {
                    self.custodian.refund(offer.maker, delta.abs())?;
                }
                moved = Some((offer.maker, offer.amount, delta));
                Ok(())
            })
            .inspect_err(|e| rejected("revise", category, Some(id), e));

        let relocation = match outcome {
            Ok(relocation) => relocation,
            Err(err) => {
                // Funds moved but the chain did not follow: put them back.
                if let Some((maker, _, delta)) = moved {
                    compensate(|| undo_delta(&self.custodian, maker, delta));
                }
                return Err(err);
            }
        };

        if let Some((_, old_amount, delta)) = moved {
            if !delta.is_zero() {
                self.events.emit(OfferEvent::Updated {
                    category: category.clone(),
                    id,
                    old_amount,
                    new_amount,
                });
            }
        }
        Ok(relocation)
    }

    /// Withdraw an offer on behalf of `caller` and refund its escrow.
    pub fn cancel(&self, caller: MakerId, category: &CategoryKey, id: OfferId) -> Result<Offer> {
        let mut refunded = false;
        let outcome = self
            .engine
            .remove_offer_guarded(category, id, |offer| {
                self.authorizer.authorize(caller, offer)?;
                self.custodian.refund(offer.maker, offer.amount)?;
                refunded = true;
                Ok(())
            })
            .inspect_err(|e| rejected("cancel", category, Some(id), e));

        let removed = match outcome {
            Ok(removed) => removed,
            Err(err) => {
                if refunded {
                    // The guard saw the record, so it is still live.
                    if let Ok(offer) = self.engine.offer(category, id) {
                        compensate(|| self.custodian.escrow(offer.maker, offer.amount));
                    }
                }
                return Err(err);
            }
        };

        self.events.emit(OfferEvent::Cancelled {
            category: category.clone(),
            id,
            maker: removed.maker,
            refunded: removed.amount,
        });
        Ok(removed)
    }

    /// Accept the best offer in `category` if it pays at least `min_amount`.
    ///
    /// The matched offer's escrow is released to `seller` and the offer is
    /// removed. Fails with `NoMatchingOffer` when nothing clears.
    pub fn fill(&self, seller: MakerId, category: &CategoryKey, min_amount: Decimal) -> Result<Offer> {
        let filled = self
            .engine
            .settle_matching_offer(category, min_amount, |offer| {
                self.custodian
                    .release_to_seller(offer.maker, seller, offer.amount)
            })
            .inspect_err(|e| rejected("fill", category, None, e))?
            .ok_or_else(|| OfferbookError::NoMatchingOffer {
                category: category.clone(),
                min_amount,
            })?;

        tracing::debug!(
            category = %category,
            offer_id = %filled.id,
            seller = %seller,
            amount = %filled.amount,
            "Offer filled"
        );
        self.events.emit(OfferEvent::Filled {
            category: category.clone(),
            id: filled.id,
            maker: filled.maker,
            seller,
            amount: filled.amount,
        });
        Ok(filled)
    }
}

/// Best-effort reversal of a custody move whose engine step failed.
fn compensate(undo: impl FnOnce() -> Result<()>) {
    if let Err(err) = undo() {
        tracing::error!(error = %err, "Custody compensation failed; funds need reconciliation");
    }
}

fn undo_delta<F: FundsCustodian>(custodian: &F, maker: MakerId, delta: Decimal) -> Result<()> {
    if delta > Decimal::ZERO {
        custodian.refund(maker, delta)
    } else if delta < Decimal::ZERO {
        custodian.escrow(maker, delta.abs())
    } else {
        Ok(())
    }
}

/// Offers are backed by escrow, so their amounts cannot go below zero.
fn check_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(OfferbookError::InvalidAmount {
            amount,
            reason: "offer amounts must not be negative".into(),
        });
    }
    Ok(())
}

fn rejected(op: &str, category: &CategoryKey, id: Option<OfferId>, err: &OfferbookError) {
    if err.is_fatal() {
        return;
    }
    tracing::warn!(
        op,
        category = %category,
        offer_id = ?id,
        error = %err,
        "Offer operation rejected"
    );
}
