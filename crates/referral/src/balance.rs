//! Balance lookup interface for the referral tree builder
//!
//! Balances come from the surrounding ledger in a single reference asset.
//! A lookup never fails: accounts without a balance record hold zero.

use refnet_types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Read-only view of account balances.
pub trait BalanceLookup {
    /// Balance of `account` in base units; zero when the account has none.
    fn balance_of(&self, account: &AccountId) -> Amount;
}

impl<T: BalanceLookup + ?Sized> BalanceLookup for &T {
    fn balance_of(&self, account: &AccountId) -> Amount {
        (**self).balance_of(account)
    }
}

impl<S: BuildHasher> BalanceLookup for HashMap<AccountId, Amount, S> {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.get(account).copied().unwrap_or(0)
    }
}

impl BalanceLookup for BTreeMap<AccountId, Amount> {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.get(account).copied().unwrap_or(0)
    }
}

// -----------------------------------------------------------------------------
// In-memory balance book (snapshots, CLI runs and tests)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryBalanceBook {
    balances: BTreeMap<AccountId, Amount>,
}

impl InMemoryBalanceBook {
    pub fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
        }
    }

    /// Build from `(account, amount)` pairs; repeated accounts accumulate.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (AccountId, Amount)>,
    {
        let mut book = Self::new();
        for (account, amount) in entries {
            book.credit(account, amount);
        }
        book
    }

    /// Overwrite the balance of `account`.
    pub fn set(&mut self, account: AccountId, amount: Amount) {
        self.balances.insert(account, amount);
    }

    /// Add `amount` to the balance of `account` (saturating).
    pub fn credit(&mut self, account: AccountId, amount: Amount) {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances (saturating).
    pub fn total(&self) -> Amount {
        self.balances
            .values()
            .fold(0, |acc: Amount, amount| acc.saturating_add(*amount))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }
}

impl BalanceLookup for InMemoryBalanceBook {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
