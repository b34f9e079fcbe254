//! In-memory escrow ledger.
//!
//! Tracks per-maker balances with available/escrowed accounting. Every
//! mutation is all-or-nothing: on error the balance is unchanged. Suitable
//! for tests and embedding, not for holding real funds.

use std::collections::HashMap;

use offerbook_types::{MakerId, OfferbookError, Result};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::collaborators::FundsCustodian;

/// One maker's funds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Free to back new offers or withdraw.
    pub available: Decimal,
    /// Locked behind live offers.
    pub escrowed: Decimal,
}

impl Account {
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.available + self.escrowed
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available.is_zero() && self.escrowed.is_zero()
    }
}

/// A [`FundsCustodian`] backed by a map of [`Account`]s.
#[derive(Debug, Default)]
pub struct LedgerCustodian {
    accounts: Mutex<HashMap<MakerId, Account>>,
}

impl LedgerCustodian {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `maker`'s available balance.
    pub fn deposit(&self, maker: MakerId, amount: Decimal) -> Result<()> {
        reject_negative(amount)?;
        let mut accounts = self.accounts.lock();
        let account = accounts.entry(maker).or_default();
        account.available = credit(account.available, amount)?;
        Ok(())
    }

    /// Balance of `maker`; zero if never funded.
    #[must_use]
    pub fn balance(&self, maker: MakerId) -> Account {
        self.accounts.lock().get(&maker).copied().unwrap_or_default()
    }

    /// Sum of every account, available plus escrowed.
    #[must_use]
    pub fn total_supply(&self) -> Decimal {
        self.accounts.lock().values().map(Account::total).sum()
    }

    /// Sum of escrow across all makers.
    #[must_use]
    pub fn total_escrowed(&self) -> Decimal {
        self.accounts.lock().values().map(|a| a.escrowed).sum()
    }
}

fn reject_negative(amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OfferbookError::CustodyFailed {
            reason: format!("negative amount {amount}"),
        });
    }
    Ok(())
}

/// `balance + amount`, or `CustodyFailed` if the sum is out of range.
fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal> {
    balance
        .checked_add(amount)
        .ok_or_else(|| OfferbookError::CustodyFailed {
            reason: format!("balance {balance} cannot absorb {amount}"),
        })
}

fn short_escrow(maker: MakerId, needed: Decimal, held: Decimal) -> OfferbookError {
    OfferbookError::CustodyFailed {
        reason: format!("{maker} has {held} in escrow, {needed} requested"),
    }
}

impl FundsCustodian for LedgerCustodian {
    fn escrow(&self, maker: MakerId, amount: Decimal) -> Result<()> {
        reject_negative(amount)?;
        let mut accounts = self.accounts.lock();
        let available = accounts.get(&maker).map_or(Decimal::ZERO, |a| a.available);
        if available < amount {
            return Err(OfferbookError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let account = accounts.entry(maker).or_default();
        let escrowed = credit(account.escrowed, amount)?;
        account.available -= amount;
        account.escrowed = escrowed;
        Ok(())
    }

    fn refund(&self, maker: MakerId, amount: Decimal) -> Result<()> {
        reject_negative(amount)?;
        let mut accounts = self.accounts.lock();
        let held = accounts.get(&maker).map_or(Decimal::ZERO, |a| a.escrowed);
        if held < amount {
            return Err(short_escrow(maker, amount, held));
        }
        let account = accounts.entry(maker).or_default();
        let available = credit(account.available, amount)?;
        account.escrowed -= amount;
        account.available = available;
        Ok(())
    }

    fn release_to_seller(&self, maker: MakerId, seller: MakerId, amount: Decimal) -> Result<()> {
        reject_negative(amount)?;
        let mut accounts = self.accounts.lock();
        let held = accounts.get(&maker).map_or(Decimal::ZERO, |a| a.escrowed);
        if held < amount {
            return Err(short_escrow(maker, amount, held));
        }
        let seller_available = credit(
            accounts.get(&seller).map_or(Decimal::ZERO, |a| a.available),
            amount,
        )?;
        accounts.entry(maker).or_default().escrowed -= amount;
        accounts.entry(seller).or_default().available = seller_available;
        Ok(())
    }
}
