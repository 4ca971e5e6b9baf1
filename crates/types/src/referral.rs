//! Referral records shared between the bonus engine and its consumers.

use crate::account::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balance contributed by a descendant to one of its ancestors.
///
/// `level` is the depth of the descendant relative to that ancestor
/// (1 = direct referral).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildBalance {
    pub account_id: AccountId,
    pub balance: Amount,
    pub level: u32,
}

impl ChildBalance {
    pub fn new(account_id: AccountId, balance: Amount, level: u32) -> Self {
        Self {
            account_id,
            balance,
            level,
        }
    }
}

/// Qualification tier. Ordered from unranked through `G`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rank {
    #[default]
    #[serde(rename = "")]
    Unranked,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Unranked => "",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::E => "E",
            Rank::F => "F",
            Rank::G => "G",
        }
    }

    pub fn is_ranked(&self) -> bool {
        *self != Rank::Unranked
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout instruction for one qualifying account.
///
/// `history` is the attribution breakdown backing `quantity`; the consumer
/// turns each instruction into an actual transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralInfo {
    pub to_account_id: AccountId,
    pub quantity: Amount,
    pub rank: Rank,
    #[serde(default)]
    pub history: Vec<ChildBalance>,
}

impl ReferralInfo {
    pub fn new(
        to_account_id: AccountId,
        quantity: Amount,
        rank: Rank,
        history: Vec<ChildBalance>,
    ) -> Self {
        Self {
            to_account_id,
            quantity,
            rank,
            history,
        }
    }

    /// Sum of the attributed contributions in `history`.
    pub fn attributed_total(&self) -> Amount {
        self.history
            .iter()
            .fold(0, |acc: Amount, cb| acc.saturating_add(cb.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_order_and_display() {
        assert!(Rank::Unranked < Rank::A);
        assert!(Rank::B < Rank::G);
        assert_eq!(Rank::C.to_string(), "C");
        assert_eq!(Rank::Unranked.to_string(), "");
        assert!(!Rank::default().is_ranked());
    }

    #[test]
    fn test_rank_serde() {
        assert_eq!(serde_json::to_string(&Rank::A).unwrap(), r#""A""#);
        assert_eq!(serde_json::to_string(&Rank::Unranked).unwrap(), r#""""#);
        let rank: Rank = serde_json::from_str(r#""F""#).unwrap();
        assert_eq!(rank, Rank::F);
    }

    #[test]
    fn test_attributed_total() {
        let info = ReferralInfo::new(
            AccountId(1),
            10,
            Rank::B,
            vec![
                ChildBalance::new(AccountId(2), 4, 1),
                ChildBalance::new(AccountId(3), 5, 2),
            ],
        );
        assert_eq!(info.attributed_total(), 9);
    }
}
