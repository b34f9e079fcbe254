//! Lifecycle events emitted by the desk after each committed change.

use offerbook_types::{CategoryKey, MakerId, OfferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One committed change to an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferEvent {
    /// Funds escrowed and the offer placed.
    Created {
        category: CategoryKey,
        id: OfferId,
        maker: MakerId,
        amount: Decimal,
    },
    /// Amount changed; escrow topped up or partially refunded.
    Updated {
        category: CategoryKey,
        id: OfferId,
        old_amount: Decimal,
        new_amount: Decimal,
    },
    /// Withdrawn by its maker; escrow refunded.
    Cancelled {
        category: CategoryKey,
        id: OfferId,
        maker: MakerId,
        refunded: Decimal,
    },
    /// Accepted by a seller; escrow released to them.
    Filled {
        category: CategoryKey,
        id: OfferId,
        maker: MakerId,
        seller: MakerId,
        amount: Decimal,
    },
}

impl OfferEvent {
    #[must_use]
    pub fn offer_id(&self) -> OfferId {
        match self {
            Self::Created { id, .. }
            | Self::Updated { id, .. }
            | Self::Cancelled { id, .. }
            | Self::Filled { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn category(&self) -> &CategoryKey {
        match self {
            Self::Created { category, .. }
            | Self::Updated { category, .. }
            | Self::Cancelled { category, .. }
            | Self::Filled { category, .. } => category,
        }
    }

    /// Short tag matching the serialized `kind`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Cancelled { .. } => "cancelled",
            Self::Filled { .. } => "filled",
        }
    }
}
