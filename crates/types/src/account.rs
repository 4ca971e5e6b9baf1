//! Account identifiers, balance units and referrer records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Balance in base units of the reference asset.
pub type Amount = u64;

/// Base units per display unit (1 display unit = 1_000 base units).
pub const PRECISION: Amount = 1_000;

/// Convert display units to base units (saturating).
#[inline]
pub const fn units(display: u64) -> Amount {
    display.saturating_mul(PRECISION)
}

/// Numeric account identifier, ordered as the account source orders it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(pub u64);

impl AccountId {
    /// Identifier of the synthetic root used when no root account is requested.
    pub const NULL: AccountId = AccountId(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for AccountId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(AccountId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the account source: an account and the account that referred it.
///
/// `referrer: None` is an unresolved referrer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    #[serde(default)]
    pub referrer: Option<AccountId>,
}

impl AccountRecord {
    pub fn new(id: impl Into<AccountId>, referrer: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            referrer: Some(referrer.into()),
        }
    }

    /// Record without a referrer.
    pub fn orphan(id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            referrer: None,
        }
    }
}
