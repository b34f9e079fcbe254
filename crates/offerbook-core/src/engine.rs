//! The shared, thread-safe offer engine.
//!
//! Category books are sharded behind their own `RwLock`. The outer map lock
//! is held only long enough to find (or create) a book, so operations on
//! different categories never contend beyond that lookup. Every mutation of
//! a category runs under its exclusive lock; reads take it shared and never
//! see a half-spliced chain.

use std::collections::HashMap;
use std::sync::Arc;

use offerbook_types::{CategoryKey, EngineConfig, MakerId, Offer, OfferId, OfferbookError, Result};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::allocator::IdAllocator;
use crate::book::{CategoryBook, Relocation};
use crate::{digest, invariants};

type SharedBook = Arc<RwLock<CategoryBook>>;

/// Sorted offer chains for every category, with a single id space.
#[derive(Debug)]
pub struct OfferEngine {
    config: EngineConfig,
    ids: IdAllocator,
    books: RwLock<HashMap<CategoryKey, SharedBook>>,
}

impl OfferEngine {
    /// Build an engine after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ids: IdAllocator::new(),
            books: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =================================================================
    // Mutations
    // =================================================================

    /// Place a new offer and return its freshly allocated id.
    ///
    /// The id is allocated under the category lock, so within a category id
    /// order is placement order and equal amounts match first-come first.
    pub fn add_offer(
        &self,
        category: &CategoryKey,
        amount: Decimal,
        maker: MakerId,
    ) -> Result<OfferId> {
        let book = self.book_or_create(category);
        let mut book = book.write();
        let id = self.ids.next_id();
        let placement = Self::logged(category, book.insert(id, maker, amount))?;
        tracing::debug!(
            category = %category,
            offer_id = %id,
            maker = %maker,
            amount = %amount,
            placement = ?placement,
            "Offer added"
        );
        self.check(&book)?;
        Ok(id)
    }

    /// Change an offer's amount and move it to its sorted position.
    pub fn update_offer(
        &self,
        category: &CategoryKey,
        id: OfferId,
        new_amount: Decimal,
    ) -> Result<Relocation> {
        self.update_offer_guarded(category, id, new_amount, |_| Ok(()))
    }

    /// Like [`update_offer`](Self::update_offer), but runs `guard` against
    /// the current record under the category lock first. A guard error
    /// aborts with the book untouched.
    pub fn update_offer_guarded<G>(
        &self,
        category: &CategoryKey,
        id: OfferId,
        new_amount: Decimal,
        guard: G,
    ) -> Result<Relocation>
    where
        G: FnOnce(&Offer) -> Result<()>,
    {
        let book = self.existing_book(category, id)?;
        let mut book = book.write();
        let old_amount = {
            let offer = book.get(id)?;
            guard(offer)?;
            offer.amount
        };
        let relocation = Self::logged(category, book.relocate(id, new_amount))?;
        tracing::debug!(
            category = %category,
            offer_id = %id,
            old_amount = %old_amount,
            amount = %new_amount,
            relocation = ?relocation,
            "Offer updated"
        );
        self.check(&book)?;
        Ok(relocation)
    }

    /// Delete an offer and return its final record.
    pub fn remove_offer(&self, category: &CategoryKey, id: OfferId) -> Result<Offer> {
        self.remove_offer_guarded(category, id, |_| Ok(()))
    }

    /// Like [`remove_offer`](Self::remove_offer), with a `guard` run under
    /// the category lock before anything is unlinked.
    pub fn remove_offer_guarded<G>(
        &self,
        category: &CategoryKey,
        id: OfferId,
        guard: G,
    ) -> Result<Offer>
    where
        G: FnOnce(&Offer) -> Result<()>,
    {
        let book = self.existing_book(category, id)?;
        let mut book = book.write();
        guard(book.get(id)?)?;
        let removed = Self::logged(category, book.remove(id))?;
        tracing::debug!(
            category = %category,
            offer_id = %id,
            amount = %removed.amount,
            remaining = book.len(),
            "Offer removed"
        );
        self.check(&book)?;
        Ok(removed)
    }

    /// Atomically take the ceiling offer if it clears `min_amount`.
    ///
    /// `settle` sees the matched offer before it is removed; an error from
    /// it leaves the offer in place. `Ok(None)` when nothing clears.
    pub fn settle_matching_offer<S>(
        &self,
        category: &CategoryKey,
        min_amount: Decimal,
        settle: S,
    ) -> Result<Option<Offer>>
    where
        S: FnOnce(&Offer) -> Result<()>,
    {
        let Some(book) = self.book(category) else {
            return Ok(None);
        };
        let mut book = book.write();
        let Some(id) = book.matching(min_amount) else {
            return Ok(None);
        };
        settle(book.get(id)?)?;
        let filled = Self::logged(category, book.remove(id))?;
        tracing::debug!(
            category = %category,
            offer_id = %id,
            amount = %filled.amount,
            min_amount = %min_amount,
            "Offer settled"
        );
        self.check(&book)?;
        Ok(Some(filled))
    }

    // =================================================================
    // Reads
    // =================================================================

    /// The ceiling offer id if its amount is `>= min_amount`.
    #[must_use]
    pub fn matching_offer(&self, category: &CategoryKey, min_amount: Decimal) -> Option<OfferId> {
        self.book(category)?.read().matching(min_amount)
    }

    /// A copy of a live offer.
    pub fn offer(&self, category: &CategoryKey, id: OfferId) -> Result<Offer> {
        let book = self.existing_book(category, id)?;
        let book = book.read();
        book.get(id).cloned()
    }

    #[must_use]
    pub fn floor(&self, category: &CategoryKey) -> Option<(OfferId, Decimal)> {
        self.book(category)?.read().floor()
    }

    #[must_use]
    pub fn ceiling(&self, category: &CategoryKey) -> Option<(OfferId, Decimal)> {
        self.book(category)?.read().ceiling()
    }

    /// Snapshot of a category, floor to ceiling.
    #[must_use]
    pub fn offers(&self, category: &CategoryKey) -> Vec<Offer> {
        self.book(category)
            .map(|book| book.read().iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live offers in `category`.
    #[must_use]
    pub fn len(&self, category: &CategoryKey) -> usize {
        self.book(category).map_or(0, |book| book.read().len())
    }

    #[must_use]
    pub fn is_empty(&self, category: &CategoryKey) -> bool {
        self.len(category) == 0
    }

    /// Every category that has ever held an offer, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryKey> {
        let mut keys: Vec<_> = self.books.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Run the full structural check on one category.
    pub fn verify(&self, category: &CategoryKey) -> Result<()> {
        let Some(book) = self.book(category) else {
            return Ok(());
        };
        let book = book.read();
        Self::logged(category, invariants::verify(&book))
    }

    /// SHA-256 digest of the category chain, floor to ceiling.
    #[must_use]
    pub fn chain_digest(&self, category: &CategoryKey) -> [u8; 32] {
        let Some(book) = self.book(category) else {
            return digest::chain_digest(std::iter::empty());
        };
        let book = book.read();
        digest::chain_digest(book.iter())
    }

    // =================================================================
    // Internals
    // =================================================================

    fn book(&self, category: &CategoryKey) -> Option<SharedBook> {
        self.books.read().get(category).cloned()
    }

    fn existing_book(&self, category: &CategoryKey, id: OfferId) -> Result<SharedBook> {
        self.book(category).ok_or_else(|| OfferbookError::OfferNotFound {
            category: category.clone(),
            id,
        })
    }

    fn book_or_create(&self, category: &CategoryKey) -> SharedBook {
        if let Some(book) = self.book(category) {
            return book;
        }
        let mut books = self.books.write();
        let capacity = self.config.category_capacity;
        Arc::clone(books.entry(category.clone()).or_insert_with(|| {
            tracing::debug!(category = %category, capacity, "Category opened");
            Arc::new(RwLock::new(CategoryBook::with_capacity(
                category.clone(),
                capacity,
            )))
        }))
    }

    /// Post-mutation check, when enabled by config.
    fn check(&self, book: &CategoryBook) -> Result<()> {
        if !self.config.verify_invariants {
            return Ok(());
        }
        Self::logged(book.category(), invariants::verify(book))
    }

    /// Log fatal errors where they surface.
    fn logged<T>(category: &CategoryKey, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if err.is_fatal() {
                tracing::error!(category = %category, error = %err, "Offer chain corrupted");
            }
        }
        result
    }
}

impl Default for OfferEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            ids: IdAllocator::new(),
            books: RwLock::new(HashMap::new()),
        }
    }
}
