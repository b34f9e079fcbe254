//! Chain digests for comparing category state across replicas.
//!
//! Two books that hold the same offers in the same chain order produce the
//! same digest, whatever sequence of operations built them. The digest
//! depends on:
//! - offer ids, in chain order
//! - maker ids
//! - amounts, normalized so `1.50` and `1.5` hash alike
//!
//! Timestamps are excluded.

use offerbook_types::{Offer, constants::CHAIN_DIGEST_DOMAIN};
use sha2::{Digest, Sha256};

/// Hash a chain walked floor to ceiling.
#[must_use]
pub fn chain_digest<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(CHAIN_DIGEST_DOMAIN);

    let mut count = 0u64;
    for offer in offers {
        hasher.update(offer.id.get().to_le_bytes());
        hasher.update(offer.maker.0.as_bytes());
        hasher.update(offer.amount.normalize().to_string().as_bytes());
        // Separator keeps "1" + "23" distinct from "12" + "3".
        hasher.update([0u8]);
        count += 1;
    }
    hasher.update(count.to_le_bytes());

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Recompute the digest of `offers` and compare with `expected`.
#[must_use]
pub fn verify_chain_digest<'a>(
    offers: impl IntoIterator<Item = &'a Offer>,
    expected: &[u8; 32],
) -> bool {
    chain_digest(offers) == *expected
}

#[must_use]
pub fn digest_hex(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use offerbook_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn offer(id: u64, amount: Decimal) -> Offer {
        let mut offer = Offer::dummy(id, amount);
        offer.maker = MakerId::from_bytes([id as u8; 16]);
        offer
    }

    #[test]
    fn empty_chain_deterministic() {
        let none: [&Offer; 0] = [];
        assert_eq!(chain_digest(none), chain_digest(Vec::<&Offer>::new()));
    }

    #[test]
    fn same_chain_same_digest() {
        let a = [offer(1, Decimal::ONE), offer(2, Decimal::TEN)];
        let b = a.clone();
        assert_eq!(chain_digest(&a), chain_digest(&b));
    }

    #[test]
    fn order_matters() {
        let x = offer(1, Decimal::ONE);
        let y = offer(2, Decimal::ONE);
        assert_ne!(
            chain_digest([&x, &y]),
            chain_digest([&y, &x]),
            "chain order must affect the digest"
        );
    }

    #[test]
    fn amount_scale_is_normalized() {
        let a = offer(1, Decimal::new(15, 1));
        let b = offer(1, Decimal::new(150, 2));
        assert_eq!(chain_digest([&a]), chain_digest([&b]));
    }

    #[test]
    fn amount_change_changes_digest() {
        let a = offer(1, Decimal::ONE);
        let b = offer(1, Decimal::TWO);
        assert_ne!(chain_digest([&a]), chain_digest([&b]));
    }

    #[test]
    fn timestamps_are_ignored() {
        let a = offer(1, Decimal::ONE);
        let mut b = a.clone();
        b.created_at += chrono::Duration::seconds(5);
        assert_eq!(chain_digest([&a]), chain_digest([&b]));
    }

    #[test]
    fn verify_and_hex() {
        let chain = [offer(1, Decimal::ONE)];
        let digest = chain_digest(&chain);
        assert!(verify_chain_digest(&chain, &digest));
        assert!(!verify_chain_digest(&chain, &[0u8; 32]));
        let hex = digest_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
