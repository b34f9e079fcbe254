//! The per-category floor/ceiling cache.
//!
//! Holds the id and cached amount of the cheapest (floor) and dearest
//! (ceiling) live offer. Both ends are empty together or set together.

use offerbook_types::OfferId;
use rust_decimal::Decimal;

/// One end of a chain: the offer id and its cached amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extreme {
    pub id: OfferId,
    pub amount: Decimal,
}

impl Extreme {
    #[must_use]
    pub fn new(id: OfferId, amount: Decimal) -> Self {
        Self { id, amount }
    }

    #[must_use]
    pub fn as_pair(self) -> (OfferId, Decimal) {
        (self.id, self.amount)
    }
}

/// Cached `(floorId, floorAmount, ceilingId, ceilingAmount)` for a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    floor: Option<Extreme>,
    ceiling: Option<Extreme>,
}

impl CategoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn floor(&self) -> Option<Extreme> {
        self.floor
    }

    #[must_use]
    pub fn ceiling(&self) -> Option<Extreme> {
        self.ceiling
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floor.is_none() && self.ceiling.is_none()
    }

    /// A single offer is both floor and ceiling.
    pub fn set_sole(&mut self, id: OfferId, amount: Decimal) {
        self.floor = Some(Extreme::new(id, amount));
        self.ceiling = Some(Extreme::new(id, amount));
    }

    pub fn set_floor(&mut self, floor: Option<Extreme>) {
        self.floor = floor;
    }

    pub fn set_ceiling(&mut self, ceiling: Option<Extreme>) {
        self.ceiling = ceiling;
    }

    /// Refresh the cached amount of `id` wherever it is an extreme.
    pub fn refresh_amount(&mut self, id: OfferId, amount: Decimal) {
        if let Some(floor) = self.floor.as_mut().filter(|f| f.id == id) {
            floor.amount = amount;
        }
        if let Some(ceiling) = self.ceiling.as_mut().filter(|c| c.id == id) {
            ceiling.amount = amount;
        }
    }

}
