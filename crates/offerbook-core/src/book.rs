//! The sorted offer chain for a single category.
//!
//! Offers live in a `HashMap<OfferId, Offer>` and are threaded into an
//! ascending doubly-linked chain through their `prev` / `next` ids. The
//! [`CategoryIndex`] caches both ends so the floor, the ceiling, and the
//! threshold match are O(1).
//!
//! Ordering rule shared by insertion and relocation: an offer is placed
//! immediately *before* the first offer whose amount is `>=` its own. Among
//! equal amounts the earliest placed offer therefore sits closest to the
//! ceiling and is matched first.
//!
//! Every mutation reads and validates everything it needs before its first
//! write, so an error leaves the book untouched.

use std::collections::HashMap;

use offerbook_types::{CategoryKey, MakerId, Offer, OfferId, OfferbookError, Result};
use rust_decimal::Decimal;

use crate::index::{CategoryIndex, Extreme};

/// Where a newly inserted offer landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The category was empty.
    Sole,
    /// Appended above the previous ceiling.
    NewCeiling,
    /// Prepended at or below the previous floor.
    NewFloor,
    /// Spliced between two existing offers.
    Interior,
}

/// What an amount change did to an offer's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    /// The new amount equals the old one.
    Unchanged,
    /// Amount changed, neighbours unchanged.
    InPlace,
    /// Moved to the top of the chain.
    NewCeiling,
    /// Moved to the bottom of the chain.
    NewFloor,
    /// Walked to a new interior position.
    Moved,
}

/// All live offers of one category, in ascending amount order.
#[derive(Debug, Clone)]
pub struct CategoryBook {
    category: CategoryKey,
    offers: HashMap<OfferId, Offer>,
    index: CategoryIndex,
}

impl CategoryBook {
    /// Create an empty book for `category`.
    #[must_use]
    pub fn new(category: CategoryKey) -> Self {
        Self::with_capacity(category, 0)
    }

    #[must_use]
    pub fn with_capacity(category: CategoryKey, capacity: usize) -> Self {
        Self {
            category,
            offers: HashMap::with_capacity(capacity),
            index: CategoryIndex::new(),
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn category(&self) -> &CategoryKey {
        &self.category
    }

    #[must_use]
    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    /// Number of live offers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Look up a live offer.
    pub fn get(&self, id: OfferId) -> Result<&Offer> {
        self.offers
            .get(&id)
            .ok_or_else(|| OfferbookError::OfferNotFound {
                category: self.category.clone(),
                id,
            })
    }

    /// The cheapest offer, or `None` if the category is empty.
    #[must_use]
    pub fn floor(&self) -> Option<(OfferId, Decimal)> {
        self.index.floor().map(Extreme::as_pair)
    }

    /// The dearest offer, or `None` if the category is empty.
    #[must_use]
    pub fn ceiling(&self) -> Option<(OfferId, Decimal)> {
        self.index.ceiling().map(Extreme::as_pair)
    }

    /// The ceiling offer if it clears `min_amount` (inclusive).
    ///
    /// Only the ceiling is ever a candidate: if it does not clear the
    /// threshold, nothing below it can.
    #[must_use]
    pub fn matching(&self, min_amount: Decimal) -> Option<OfferId> {
        self.index
            .ceiling()
            .filter(|c| c.amount >= min_amount)
            .map(|c| c.id)
    }

    /// Walk the chain from floor to ceiling.
    #[must_use]
    pub fn iter(&self) -> Chain<'_> {
        Chain::new(self, self.index.floor().map(|f| f.id), Direction::Up)
    }

    /// Walk the chain from ceiling to floor.
    #[must_use]
    pub fn iter_rev(&self) -> Chain<'_> {
        Chain::new(self, self.index.ceiling().map(|c| c.id), Direction::Down)
    }

    pub(crate) fn records(&self) -> &HashMap<OfferId, Offer> {
        &self.offers
    }

    #[cfg(test)]
    pub(crate) fn records_mut(&mut self) -> &mut HashMap<OfferId, Offer> {
        &mut self.offers
    }

    #[cfg(test)]
    pub(crate) fn index_mut(&mut self) -> &mut CategoryIndex {
        &mut self.index
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Place a new offer under a freshly allocated `id`.
    pub fn insert(&mut self, id: OfferId, maker: MakerId, amount: Decimal) -> Result<Placement> {
        if id.is_null() || self.offers.contains_key(&id) {
            return Err(self.violation(format!("refusing to insert reused id {id}")));
        }
        let offer = Offer::new(id, self.category.clone(), maker, amount);

        if self.index.is_empty() {
            self.offers.insert(id, offer);
            self.index.set_sole(id, amount);
            return Ok(Placement::Sole);
        }

        let (floor, ceiling) = self.extremes()?;
        let (lower, upper, placement) = if amount > ceiling.amount {
            (Some(ceiling.id), None, Placement::NewCeiling)
        } else if amount <= floor.amount {
            (None, Some(floor.id), Placement::NewFloor)
        } else {
            let stop = self.seek_up(floor.id, amount)?;
            (self.link(stop)?.prev, Some(stop), Placement::Interior)
        };

        self.offers.insert(id, offer);
        self.attach(id, amount, lower, upper);
        Ok(placement)
    }

    // =================================================================
    // Relocation
    // =================================================================

    /// Change the amount of a live offer and restore sorted order.
    ///
    /// The direction of the move is derived from the current amount.
    pub fn relocate(&mut self, id: OfferId, new_amount: Decimal) -> Result<Relocation> {
        let (old_amount, prev, next) = {
            let offer = self.get(id)?;
            (offer.amount, offer.prev, offer.next)
        };
        if new_amount == old_amount {
            return Ok(Relocation::Unchanged);
        }
        let increasing = new_amount > old_amount;

        let stays = match (increasing, prev, next) {
            // Sole offer, or already at the end it is moving toward.
            (_, None, None) | (true, _, None) | (false, None, _) => true,
            (true, _, Some(next)) => new_amount <= self.link(next)?.amount,
            (false, Some(prev), _) => new_amount > self.link(prev)?.amount,
        };
        if stays {
            self.set_amount(id, new_amount);
            return Ok(Relocation::InPlace);
        }

        let (floor, ceiling) = self.extremes()?;
        let (lower, upper, outcome) = if increasing && new_amount > ceiling.amount {
            (Some(ceiling.id), None, Relocation::NewCeiling)
        } else if !increasing && new_amount <= floor.amount {
            (None, Some(floor.id), Relocation::NewFloor)
        } else if increasing {
            let start = next.ok_or_else(|| self.violation(format!("{id} has no next")))?;
            let stop = self.seek_up(start, new_amount)?;
            (self.link(stop)?.prev, Some(stop), Relocation::Moved)
        } else {
            let start = prev.ok_or_else(|| self.violation(format!("{id} has no prev")))?;
            let anchor = self.seek_down(start, new_amount)?.ok_or_else(|| {
                self.violation(format!("no offer below {new_amount} above the floor"))
            })?;
            (Some(anchor), self.link(anchor)?.next, Relocation::Moved)
        };

        self.detach(id)?;
        self.set_amount(id, new_amount);
        self.attach(id, new_amount, lower, upper);
        Ok(outcome)
    }

    // =================================================================
    // Removal
    // =================================================================

    /// Unlink and delete a live offer, promoting a new floor / ceiling
    /// where needed. Returns the removed record (unlinked).
    pub fn remove(&mut self, id: OfferId) -> Result<Offer> {
        self.get(id)?;
        self.detach(id)?;
        self.offers
            .remove(&id)
            .ok_or_else(|| self.violation(format!("{id} vanished during removal")))
    }

    // =================================================================
    // Splicing
    // =================================================================

    /// Resolve a chain link. A missing record here means the chain is
    /// corrupt, not that the caller asked for a bad id.
    fn link(&self, id: OfferId) -> Result<&Offer> {
        self.offers
            .get(&id)
            .ok_or_else(|| self.violation(format!("dangling link to {id}")))
    }

    fn extremes(&self) -> Result<(Extreme, Extreme)> {
        match (self.index.floor(), self.index.ceiling()) {
            (Some(floor), Some(ceiling)) => {
                self.link(floor.id)?;
                self.link(ceiling.id)?;
                Ok((floor, ceiling))
            }
            _ => Err(self.violation("non-empty category is missing an extreme")),
        }
    }

    fn violation(&self, reason: impl Into<String>) -> OfferbookError {
        OfferbookError::InvariantViolation {
            category: self.category.clone(),
            reason: reason.into(),
        }
    }

    /// Walk toward the ceiling from `from` while the current amount is below
    /// `amount`; stop at the first offer `>= amount` or at the ceiling.
    fn seek_up(&self, from: OfferId, amount: Decimal) -> Result<OfferId> {
        let mut cursor = from;
        for _ in 0..=self.offers.len() {
            let node = self.link(cursor)?;
            match node.next {
                Some(next) if node.amount < amount => cursor = next,
                _ => return Ok(cursor),
            }
        }
        Err(self.violation(format!("cycle walking up from {from}")))
    }

    /// Walk toward the floor from `from` to the first offer strictly below
    /// `amount`. `None` if every offer down to the floor is `>= amount`.
    fn seek_down(&self, from: OfferId, amount: Decimal) -> Result<Option<OfferId>> {
        let mut cursor = from;
        for _ in 0..=self.offers.len() {
            let node = self.link(cursor)?;
            if node.amount < amount {
                return Ok(Some(cursor));
            }
            match node.prev {
                Some(prev) => cursor = prev,
                None => return Ok(None),
            }
        }
        Err(self.violation(format!("cycle walking down from {from}")))
    }

    /// Unlink `id` from its neighbours. A detached floor promotes its `next`
    /// to floor; a detached ceiling promotes its `prev` to ceiling.
    fn detach(&mut self, id: OfferId) -> Result<()> {
        let (prev, next) = {
            let node = self.link(id)?;
            (node.prev, node.next)
        };
        let lower = prev
            .map(|p| self.link(p).map(|o| Extreme::new(p, o.amount)))
            .transpose()?;
        let upper = next
            .map(|n| self.link(n).map(|o| Extreme::new(n, o.amount)))
            .transpose()?;

        match lower {
            Some(lower) => self.set_next(lower.id, next),
            None => self.index.set_floor(upper),
        }
        match upper {
            Some(upper) => self.set_prev(upper.id, prev),
            None => self.index.set_ceiling(lower),
        }
        self.set_prev(id, None);
        self.set_next(id, None);
        Ok(())
    }

    /// Link `id` between two adjacent offers (`None` = chain end). Callers
    /// validate `lower` / `upper` before the first write.
    fn attach(
        &mut self,
        id: OfferId,
        amount: Decimal,
        lower: Option<OfferId>,
        upper: Option<OfferId>,
    ) {
        self.set_prev(id, lower);
        self.set_next(id, upper);
        match lower {
            Some(lower) => self.set_next(lower, Some(id)),
            None => self.index.set_floor(Some(Extreme::new(id, amount))),
        }
        match upper {
            Some(upper) => self.set_prev(upper, Some(id)),
            None => self.index.set_ceiling(Some(Extreme::new(id, amount))),
        }
    }

    fn set_amount(&mut self, id: OfferId, amount: Decimal) {
        if let Some(node) = self.offers.get_mut(&id) {
            node.amount = amount;
        }
        self.index.refresh_amount(id, amount);
    }

    fn set_prev(&mut self, id: OfferId, prev: Option<OfferId>) {
        if let Some(node) = self.offers.get_mut(&id) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, id: OfferId, next: Option<OfferId>) {
        if let Some(node) = self.offers.get_mut(&id) {
            node.next = next;
        }
    }
}

// =====================================================================
// Iteration
// =====================================================================

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Iterator over a category chain. Bounded by the number of live offers,
/// so a corrupt (cyclic) chain cannot loop forever.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    book: &'a CategoryBook,
    cursor: Option<OfferId>,
    direction: Direction,
    remaining: usize,
}

impl<'a> Chain<'a> {
    fn new(book: &'a CategoryBook, start: Option<OfferId>, direction: Direction) -> Self {
        Self {
            book,
            cursor: start,
            direction,
            remaining: book.len(),
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Offer;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let offer = self.book.offers.get(&self.cursor?)?;
        self.remaining -= 1;
        self.cursor = match self.direction {
            Direction::Up => offer.next,
            Direction::Down => offer.prev,
        };
        Some(offer)
    }
}
