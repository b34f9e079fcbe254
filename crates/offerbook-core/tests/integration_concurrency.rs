//! Integration test: concurrent access
//!
//! Many threads share one engine. Categories are independent; threads that
//! contend on the same category must still leave a well-formed chain.

use std::sync::Arc;
use std::thread;

use offerbook_core::OfferEngine;
use offerbook_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn engine() -> Arc<OfferEngine> {
    Arc::new(OfferEngine::new(EngineConfig::strict()).unwrap())
}

#[test]
fn distinct_categories_from_many_threads() {
    let engine = engine();
    let handles: Vec<_> = (0..8u64)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t);
                let cat = CategoryKey::new(format!("cat/{t}"));
                let mut live = Vec::new();
                for _ in 0..500 {
                    if live.is_empty() || rng.gen_bool(0.5) {
                        let amount = Decimal::new(rng.gen_range(0..50), 0);
                        live.push(engine.add_offer(&cat, amount, MakerId::new()).unwrap());
                    } else if rng.gen_bool(0.5) {
                        let id = live[rng.gen_range(0..live.len())];
                        let amount = Decimal::new(rng.gen_range(0..50), 0);
                        engine.update_offer(&cat, id, amount).unwrap();
                    } else {
                        let id = live.swap_remove(rng.gen_range(0..live.len()));
                        engine.remove_offer(&cat, id).unwrap();
                    }
                }
                (cat, live.len())
            })
        })
        .collect();

    for handle in handles {
        let (cat, live) = handle.join().unwrap();
        assert_eq!(engine.len(&cat), live);
        engine.verify(&cat).unwrap();
    }
    assert_eq!(engine.categories().len(), 8);
}

#[test]
fn contended_category_stays_well_formed() {
    let engine = engine();
    let cat = CategoryKey::new("hot");

    thread::scope(|s| {
        for t in 0..6u64 {
            let engine = &engine;
            let cat = &cat;
            s.spawn(move || {
                let mut rng = StdRng::seed_from_u64(100 + t);
                let mut mine = Vec::new();
                for _ in 0..300 {
                    let amount = Decimal::new(rng.gen_range(0..20), 0);
                    mine.push(engine.add_offer(cat, amount, MakerId::new()).unwrap());
                    if mine.len() > 10 {
                        let id = mine.swap_remove(0);
                        engine.remove_offer(cat, id).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(engine.len(&cat), 6 * 10);
    engine.verify(&cat).unwrap();

    let offers = engine.offers(&cat);
    assert!(offers.windows(2).all(|w| w[0].amount <= w[1].amount));
}

#[test]
fn ids_stay_unique_across_threads() {
    let engine = engine();
    let mut all: Vec<OfferId> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let engine = &engine;
                s.spawn(move || {
                    let cat = CategoryKey::new(format!("c{}", t % 2));
                    (0..250)
                        .map(|_| engine.add_offer(&cat, Decimal::ONE, MakerId::new()).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 1000);
    assert_eq!(all.first(), Some(&OfferId(1)));
    assert_eq!(all.last(), Some(&OfferId(1000)));
}

#[test]
fn equal_amounts_match_in_arrival_order_under_contention() {
    let engine = engine();
    let cat = CategoryKey::new("fifo");

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    engine.add_offer(&cat, Decimal::TEN, MakerId::new()).unwrap();
                }
            });
        }
    });

    // Ids are allocated under the category lock, so the smallest id is the
    // earliest placement and must be matched first.
    let mut previous = OfferId::NULL;
    while let Some(filled) = engine
        .settle_matching_offer(&cat, Decimal::TEN, |_| Ok(()))
        .unwrap()
    {
        assert!(filled.id > previous, "{} matched after {previous}", filled.id);
        previous = filled.id;
    }
    assert!(engine.is_empty(&cat));
}
