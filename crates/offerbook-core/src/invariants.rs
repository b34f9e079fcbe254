//! Full structural check of a category chain.
//!
//! Walks the chain in both directions and checks, in order:
//! - no record exists for the null id and every record is keyed by its own id
//! - floor and ceiling are both set or both empty, empty iff no offers
//! - the forward walk visits every offer once, in non-decreasing order,
//!   with consistent back links, and ends at the ceiling
//! - the backward walk visits every offer once and ends at the floor
//! - cached floor/ceiling amounts match the records
//!
//! Any failure is an [`OfferbookError::InvariantViolation`].

use std::collections::HashSet;

use offerbook_types::{OfferId, OfferbookError, Result};
use rust_decimal::Decimal;

use crate::book::CategoryBook;

/// Verify every structural invariant of `book`.
pub fn verify(book: &CategoryBook) -> Result<()> {
    let fail = |reason: String| {
        Err(OfferbookError::InvariantViolation {
            category: book.category().clone(),
            reason,
        })
    };
    let records = book.records();

    if records.contains_key(&OfferId::NULL) {
        return fail("record exists for the null id".into());
    }
    if let Some((key, offer)) = records.iter().find(|(key, offer)| **key != offer.id) {
        return fail(format!("record keyed {key} carries id {}", offer.id));
    }
    if let Some(offer) = records.values().find(|o| o.category != *book.category()) {
        return fail(format!("{} belongs to {}", offer.id, offer.category));
    }

    let (floor, ceiling) = match (book.index().floor(), book.index().ceiling()) {
        (None, None) if records.is_empty() => return Ok(()),
        (None, None) => return fail(format!("{} offers but no floor/ceiling", records.len())),
        (Some(floor), Some(ceiling)) => (floor, ceiling),
        _ => return fail("exactly one of floor/ceiling is set".into()),
    };

    // Forward: floor -> ceiling via `next`.
    let mut seen = HashSet::with_capacity(records.len());
    let mut last: Option<(OfferId, Decimal)> = None;
    let mut cursor = Some(floor.id);
    while let Some(id) = cursor {
        let Some(offer) = records.get(&id) else {
            return fail(format!("forward walk hit dangling {id}"));
        };
        if !seen.insert(id) {
            return fail(format!("forward walk revisited {id}"));
        }
        if offer.prev != last.map(|(prev, _)| prev) {
            return fail(format!("{id} has prev {:?}, walked from {last:?}", offer.prev));
        }
        if let Some((prev, amount)) = last {
            if offer.amount < amount {
                return fail(format!(
                    "{id} ({}) sorts below its prev {prev} ({amount})",
                    offer.amount
                ));
            }
        }
        last = Some((id, offer.amount));
        cursor = offer.next;
    }
    if last.map(|(id, _)| id) != Some(ceiling.id) {
        return fail(format!("forward walk ended at {last:?}, ceiling is {}", ceiling.id));
    }
    if seen.len() != records.len() {
        return fail(format!(
            "forward walk reached {} of {} offers",
            seen.len(),
            records.len()
        ));
    }

    // Backward: ceiling -> floor via `prev`.
    let mut count = 0usize;
    let mut end = ceiling.id;
    let mut cursor = Some(ceiling.id);
    while let Some(id) = cursor {
        count += 1;
        if count > records.len() {
            return fail(format!("backward walk exceeded {} offers", records.len()));
        }
        end = id;
        cursor = records.get(&id).and_then(|o| o.prev);
    }
    if end != floor.id || count != records.len() {
        return fail(format!(
            "backward walk ended at {end} after {count} offers, floor is {}",
            floor.id
        ));
    }

    // Cache coherence.
    let floor_amount = records.get(&floor.id).map(|o| o.amount);
    if floor_amount != Some(floor.amount) {
        return fail(format!(
            "cached floor amount {} differs from record {floor_amount:?}",
            floor.amount
        ));
    }
    let ceiling_amount = records.get(&ceiling.id).map(|o| o.amount);
    if ceiling_amount != Some(ceiling.amount) {
        return fail(format!(
            "cached ceiling amount {} differs from record {ceiling_amount:?}",
            ceiling.amount
        ));
    }

    Ok(())
}
