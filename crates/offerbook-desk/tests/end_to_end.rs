//! End-to-end integration tests: desk, custody, and engine together.
//!
//! These tests drive realistic marketplace sessions through the desk and
//! check that the chain, the ledger, and the event stream agree: funds are
//! conserved, escrow always equals the sum of live offers, and every
//! committed change produces exactly one event.

use std::sync::Arc;
use std::thread;

use offerbook_core::OfferEngine;
use offerbook_desk::*;
use offerbook_types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

type Desk = OfferDesk<MakerOnly, Arc<LedgerCustodian>, Arc<RecordingEventSink>>;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Desk over a strict engine, plus handles on its ledger and event log.
fn market() -> (Desk, Arc<LedgerCustodian>, Arc<RecordingEventSink>) {
    let config = EngineConfig::from_json_str(
        r#"{"verify_invariants": true, "category_capacity": 16, "log": {"format": "compact"}}"#,
    )
    .unwrap();
    let engine = Arc::new(OfferEngine::new(config).unwrap());
    let ledger = Arc::new(LedgerCustodian::new());
    let events = Arc::new(RecordingEventSink::new());
    let desk = OfferDesk::new(engine, MakerOnly, Arc::clone(&ledger), Arc::clone(&events));
    (desk, ledger, events)
}

fn live_total(engine: &OfferEngine) -> Decimal {
    engine
        .categories()
        .iter()
        .flat_map(|c| engine.offers(c))
        .map(|o| o.amount)
        .sum()
}

#[test]
fn marketplace_session() {
    let (desk, ledger, events) = market();
    let art = CategoryKey::new("art/prints");
    let (alice, bob, carol, seller) = (MakerId::new(), MakerId::new(), MakerId::new(), MakerId::new());
    for maker in [alice, bob, carol] {
        ledger.deposit(maker, dec(1_000)).unwrap();
    }

    let a = desk.place(&art, alice, dec(120)).unwrap();
    let b = desk.place(&art, bob, dec(150)).unwrap();
    let c = desk.place(&art, carol, dec(150)).unwrap();

    // Equal amounts: bob arrived first, so bob's offer is the ceiling.
    assert_eq!(desk.engine().matching_offer(&art, dec(150)), Some(b));

    // Alice outbids everyone.
    desk.revise(alice, &art, a, dec(200)).unwrap();
    assert_eq!(desk.engine().ceiling(&art), Some((a, dec(200))));
    assert_eq!(ledger.balance(alice).escrowed, dec(200));

    // Seller accepts anything >= 150: alice is paid out first, then bob.
    assert_eq!(desk.fill(seller, &art, dec(150)).unwrap().id, a);
    assert_eq!(desk.fill(seller, &art, dec(150)).unwrap().id, b);
    assert_eq!(ledger.balance(seller).available, dec(350));

    // Carol withdraws; the category empties but stays known.
    desk.cancel(carol, &art, c).unwrap();
    assert!(desk.engine().is_empty(&art));
    assert_eq!(ledger.balance(carol).available, dec(1_000));

    assert_eq!(ledger.total_supply(), dec(3_000));
    assert_eq!(ledger.total_escrowed(), Decimal::ZERO);

    let kinds: Vec<&str> = events.events().iter().map(OfferEvent::kind).collect();
    assert_eq!(
        kinds,
        vec!["created", "created", "created", "updated", "filled", "filled", "cancelled"]
    );
}

#[test]
fn rejected_operations_leave_no_trace() {
    let (desk, ledger, events) = market();
    let cat = CategoryKey::new("music/vinyl");
    let (owner, intruder) = (MakerId::new(), MakerId::new());
    ledger.deposit(owner, dec(100)).unwrap();
    let id = desk.place(&cat, owner, dec(60)).unwrap();
    let digest = desk.engine().chain_digest(&cat);
    let recorded = events.len();

    assert!(matches!(
        desk.revise(intruder, &cat, id, dec(1)),
        Err(OfferbookError::Unauthorized { .. })
    ));
    assert!(matches!(
        desk.cancel(intruder, &cat, id),
        Err(OfferbookError::Unauthorized { .. })
    ));
    assert!(matches!(
        desk.revise(owner, &cat, id, dec(101)),
        Err(OfferbookError::InsufficientFunds { .. })
    ));
    assert!(matches!(
        desk.place(&cat, intruder, dec(1)),
        Err(OfferbookError::InsufficientFunds { .. })
    ));
    assert!(matches!(
        desk.fill(intruder, &cat, dec(61)),
        Err(OfferbookError::NoMatchingOffer { .. })
    ));

    assert_eq!(desk.engine().chain_digest(&cat), digest);
    assert_eq!(events.len(), recorded);
    assert_eq!(ledger.balance(owner).escrowed, dec(60));
    assert_eq!(ledger.balance(owner).available, dec(40));
}

#[test]
fn event_log_serializes_as_json_lines() {
    let (desk, ledger, events) = market();
    let cat = CategoryKey::new("art/1");
    let maker = MakerId::new();
    ledger.deposit(maker, dec(10)).unwrap();
    let id = desk.place(&cat, maker, Decimal::new(25, 1)).unwrap();
    desk.cancel(maker, &cat, id).unwrap();

    let lines: Vec<String> = events
        .events()
        .iter()
        .map(|e| serde_json::to_string(e).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(r#""kind":"created""#));
    assert!(lines[0].contains(r#""amount":"2.5""#));

    let back: Vec<OfferEvent> = lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(back, events.events());
}

#[test]
fn escrow_tracks_live_offers_under_concurrency() {
    let (desk, ledger, events) = market();
    let desk = Arc::new(desk);
    let makers: Vec<MakerId> = (0..6).map(|_| MakerId::new()).collect();
    for maker in &makers {
        ledger.deposit(*maker, dec(10_000)).unwrap();
    }
    let supply = ledger.total_supply();

    let handles: Vec<_> = makers
        .iter()
        .enumerate()
        .map(|(t, maker)| {
            let desk = Arc::clone(&desk);
            let maker = *maker;
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(t as u64);
                let categories = [CategoryKey::new("a"), CategoryKey::new("b")];
                let mut mine: Vec<(CategoryKey, OfferId)> = Vec::new();
                let seller = MakerId::new();
                for _ in 0..200 {
                    let cat = categories[rng.gen_range(0..2)].clone();
                    match rng.gen_range(0..5) {
                        0 | 1 => {
                            let amount = dec(rng.gen_range(1..50));
                            mine.push((cat.clone(), desk.place(&cat, maker, amount).unwrap()));
                        }
                        2 if !mine.is_empty() => {
                            let (cat, id) = mine[rng.gen_range(0..mine.len())].clone();
                            // Another thread's fill may have taken it.
                            let _ = desk.revise(maker, &cat, id, dec(rng.gen_range(1..50)));
                        }
                        3 => {
                            if let Ok(filled) = desk.fill(seller, &cat, dec(rng.gen_range(1..50))) {
                                mine.retain(|(_, id)| *id != filled.id);
                            }
                        }
                        4 if !mine.is_empty() => {
                            let (cat, id) = mine.swap_remove(rng.gen_range(0..mine.len()));
                            let _ = desk.cancel(maker, &cat, id);
                        }
                        _ => {}
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for cat in desk.engine().categories() {
        desk.engine().verify(&cat).unwrap();
    }
    assert_eq!(ledger.total_escrowed(), live_total(desk.engine()));
    assert_eq!(ledger.total_supply(), supply);
    assert!(!events.is_empty());
}
