//! The offer record stored in a category chain.
//!
//! An offer is one outstanding, all-or-nothing bid. Its `amount` is the sole
//! sort key of the chain; `prev` / `next` link it to its neighbours in
//! ascending order (`None` at the floor and at the ceiling respectively).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CategoryKey, MakerId, OfferId};

/// One outstanding bid for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub category: CategoryKey,
    pub maker: MakerId,
    pub amount: Decimal,
    /// Lower neighbour; `None` when this offer is the floor.
    pub prev: Option<OfferId>,
    /// Higher neighbour; `None` when this offer is the ceiling.
    pub next: Option<OfferId>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// A fresh, unlinked offer.
    #[must_use]
    pub fn new(id: OfferId, category: CategoryKey, maker: MakerId, amount: Decimal) -> Self {
        Self {
            id,
            category,
            maker,
            amount,
            prev: None,
            next: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_unlinked(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }

    /// Whether this offer clears a minimum acceptable amount (inclusive).
    #[must_use]
    pub fn clears(&self, min_amount: Decimal) -> bool {
        self.amount >= min_amount
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(id: u64, amount: Decimal) -> Self {
        Self::new(
            OfferId(id),
            CategoryKey::new("test/1"),
            MakerId::new(),
            amount,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_offer_is_unlinked() {
        let offer = Offer::dummy(1, Decimal::new(5, 0));
        assert!(offer.is_unlinked());
        assert_eq!(offer.id, OfferId(1));
    }

    #[test]
    fn clears_is_inclusive() {
        let offer = Offer::dummy(1, Decimal::new(10, 0));
        assert!(offer.clears(Decimal::new(10, 0)));
        assert!(offer.clears(Decimal::new(95, 1)));
        assert!(!offer.clears(Decimal::new(1001, 2)));
    }

    #[test]
    fn linked_offer_is_not_unlinked() {
        let mut offer = Offer::dummy(2, Decimal::ONE);
        offer.next = Some(OfferId(3));
        assert!(!offer.is_unlinked());
    }

    #[test]
    fn serde_roundtrip() {
        let mut offer = Offer::dummy(4, Decimal::new(15, 1));
        offer.prev = Some(OfferId(1));
        let json = serde_json::to_string(&offer).unwrap();
        assert!(json.contains("\"1.5\""), "amount serialises as string: {json}");
        let back: Offer = serde_json::from_str(&json).unwrap();
        assert_eq!(offer, back);
    }
}
