//! Per-node aggregates of the referral tree
//!
//! A `LeafInfo` holds an account's own balance plus the contributions of its
//! whole referred subtree. Aggregates only grow, one descendant at a time,
//! through [`LeafInfo::add_child_balance`].

use crate::params::ReferralParams;
use refnet_types::{apply_rate, AccountId, Amount, BonusBps, ChildBalance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeafInfo {
    pub account_id: AccountId,
    /// Own balance, fixed at node creation.
    pub balance: Amount,
    /// Direct referrals clearing the partner threshold.
    pub level_1_partners: u32,
    /// Sum of all direct referral balances.
    pub level_1_sum: Amount,
    /// Second-level referrals clearing the partner threshold.
    pub level_2_partners: u32,
    /// Descendants at any level clearing the partner threshold.
    pub all_partners: u32,
    /// Sum of all descendant balances.
    pub all_sum: Amount,
    /// One record per descendant, in insertion order.
    pub child_balances: Vec<ChildBalance>,
}

impl LeafInfo {
    pub fn new(account_id: AccountId, balance: Amount) -> Self {
        Self {
            account_id,
            balance,
            ..Default::default()
        }
    }

    /// Record a descendant's balance at `level` below this node.
    ///
    /// Sums always grow; partner counters only grow when `balance` reaches
    /// `partner_threshold`. Levels past 2 only feed the `all_*` aggregates.
    pub fn add_child_balance(
        &mut self,
        account_id: AccountId,
        balance: Amount,
        level: u32,
        partner_threshold: Amount,
    ) {
        self.all_sum = self.all_sum.saturating_add(balance);
        self.child_balances
            .push(ChildBalance::new(account_id, balance, level));
        if level == 1 {
            self.level_1_sum = self.level_1_sum.saturating_add(balance);
        }

        if balance < partner_threshold {
            return;
        }

        self.all_partners = self.all_partners.saturating_add(1);
        match level {
            1 => self.level_1_partners = self.level_1_partners.saturating_add(1),
            2 => self.level_2_partners = self.level_2_partners.saturating_add(1),
            _ => {}
        }
    }

    /// Own balance and direct partner count both clear the qualification gate.
    pub fn meets_qualifying_gate(&self, params: &ReferralParams) -> bool {
        self.balance >= params.qualify_balance_amount()
            && self.level_1_partners >= params.min_direct_partners
    }

    /// Enough second-level partners for the deep-network bands.
    pub fn has_deep_network(&self, params: &ReferralParams) -> bool {
        self.level_2_partners >= params.deep_network_partners
    }

    /// Balance the bonus is computed on: the whole subtree for deep networks,
    /// direct referrals otherwise.
    pub fn bonus_base(&self, params: &ReferralParams) -> Amount {
        if self.has_deep_network(params) {
            self.all_sum
        } else {
            self.level_1_sum
        }
    }

    /// `payout_rate × bonus × bonus_base`, floored.
    pub fn bonus_value(&self, bonus: BonusBps, params: &ReferralParams) -> Amount {
        apply_rate(self.bonus_base(params), params.payout_rate_bps, bonus)
    }

    /// Per-descendant attribution of the bonus.
    ///
    /// Each contribution is scaled like the bonus itself; zero results are
    /// dropped. At the configured direct-tier percentage (0.25 by default) only
    /// level-1 entries remain; validated band bonuses all sit below it and keep
    /// every level.
    pub fn attributed_child_balances(
        &self,
        bonus: BonusBps,
        params: &ReferralParams,
    ) -> Vec<ChildBalance> {
        let direct_only = bonus >= params.direct_bonus;
        self.child_balances
            .iter()
            .filter(|cb| !direct_only || cb.level == 1)
            .filter_map(|cb| {
                let scaled = apply_rate(cb.balance, params.payout_rate_bps, bonus);
                (scaled > 0).then_some(ChildBalance {
                    balance: scaled,
                    ..*cb
                })
            })
            .collect()
    }
}

// Aggregate equality; the contribution log depends on insertion order and is
// left out.
impl PartialEq for LeafInfo {
    fn eq(&self, other: &Self) -> bool {
        self.account_id == other.account_id
            && self.balance == other.balance
            && self.level_1_partners == other.level_1_partners
            && self.level_1_sum == other.level_1_sum
            && self.level_2_partners == other.level_2_partners
            && self.all_partners == other.all_partners
            && self.all_sum == other.all_sum
    }
}

impl Eq for LeafInfo {}

#[cfg(test)]
mod tests {
    use super::*;
    use refnet_types::units;

    const THRESHOLD: Amount = 100_000;

    #[test]
    fn test_add_child_balance_levels() {
        let mut leaf = LeafInfo::new(AccountId(1), 0);
        leaf.add_child_balance(AccountId(2), 300_000, 1, THRESHOLD);
        leaf.add_child_balance(AccountId(3), 150_000, 2, THRESHOLD);
        leaf.add_child_balance(AccountId(4), 120_000, 3, THRESHOLD);

        assert_eq!(leaf.level_1_partners, 1);
        assert_eq!(leaf.level_1_sum, 300_000);
        assert_eq!(leaf.level_2_partners, 1);
        assert_eq!(leaf.all_partners, 3);
        assert_eq!(leaf.all_sum, 570_000);
        assert_eq!(leaf.child_balances.len(), 3);
        assert_eq!(
            leaf.child_balances[2],
            ChildBalance::new(AccountId(4), 120_000, 3)
        );
    }

    #[test]
    fn test_below_threshold_updates_sums_only() {
        let mut leaf = LeafInfo::new(AccountId(1), 0);
        leaf.add_child_balance(AccountId(2), THRESHOLD - 1, 1, THRESHOLD);
        leaf.add_child_balance(AccountId(3), 0, 2, THRESHOLD);

        assert_eq!(leaf.level_1_partners, 0);
        assert_eq!(leaf.level_2_partners, 0);
        assert_eq!(leaf.all_partners, 0);
        assert_eq!(leaf.level_1_sum, THRESHOLD - 1);
        assert_eq!(leaf.all_sum, THRESHOLD - 1);
        assert_eq!(leaf.child_balances.len(), 2);

        leaf.add_child_balance(AccountId(4), THRESHOLD, 1, THRESHOLD);
        assert_eq!(leaf.level_1_partners, 1);
    }

    #[test]
    fn test_bonus_value_uses_direct_sum_for_shallow_network() {
        let params = ReferralParams::default();
        let mut leaf = LeafInfo::new(AccountId(1), units(200));
        for id in 2..7 {
            leaf.add_child_balance(AccountId(id), units(300), 1, THRESHOLD);
        }
        leaf.add_child_balance(AccountId(10), units(300), 2, THRESHOLD);

        assert!(!leaf.has_deep_network(&params));
        assert_eq!(leaf.bonus_base(&params), 1_500_000);
        assert_eq!(leaf.bonus_value(BonusBps(2_500), &params), 2_437);
        assert_eq!(leaf.bonus_value(BonusBps::ZERO, &params), 0);
    }

    #[test]
    fn test_bonus_value_uses_subtree_sum_for_deep_network() {
        let params = ReferralParams::default();
        let leaf = LeafInfo {
            account_id: AccountId(1),
            balance: units(600),
            level_1_partners: 5,
            level_1_sum: 1_500_000,
            level_2_partners: 30,
            all_partners: 35,
            all_sum: 6_000_000,
            child_balances: Vec::new(),
        };
        assert_eq!(leaf.bonus_base(&params), 6_000_000);
        assert_eq!(leaf.bonus_value(BonusBps(2_000), &params), 7_800);
    }

    #[test]
    fn test_attributed_child_balances_direct_tier_keeps_level_one() {
        let params = ReferralParams::default();
        let mut leaf = LeafInfo::new(AccountId(1), units(200));
        leaf.add_child_balance(AccountId(2), 300_000, 1, THRESHOLD);
        leaf.add_child_balance(AccountId(3), 300_000, 2, THRESHOLD);
        leaf.add_child_balance(AccountId(4), 100, 1, THRESHOLD);

        let history = leaf.attributed_child_balances(BonusBps(2_500), &params);
        assert_eq!(history, vec![ChildBalance::new(AccountId(2), 487, 1)]);
    }

    #[test]
    fn test_attributed_child_balances_lower_tiers_keep_every_level() {
        let params = ReferralParams::default();
        let mut leaf = LeafInfo::new(AccountId(1), units(600));
        leaf.add_child_balance(AccountId(2), 300_000, 1, THRESHOLD);
        leaf.add_child_balance(AccountId(3), 150_000, 2, THRESHOLD);
        leaf.add_child_balance(AccountId(4), 150_000, 3, THRESHOLD);

        let history = leaf.attributed_child_balances(BonusBps(2_000), &params);
        assert_eq!(
            history,
            vec![
                ChildBalance::new(AccountId(2), 390, 1),
                ChildBalance::new(AccountId(3), 195, 2),
                ChildBalance::new(AccountId(4), 195, 3),
            ]
        );
        assert!(leaf
            .attributed_child_balances(BonusBps::ZERO, &params)
            .is_empty());
    }

    #[test]
    fn test_equality_ignores_contribution_order() {
        let mut a = LeafInfo::new(AccountId(1), 5);
        let mut b = LeafInfo::new(AccountId(1), 5);
        a.add_child_balance(AccountId(2), 200_000, 1, THRESHOLD);
        a.add_child_balance(AccountId(3), 50, 1, THRESHOLD);
        b.add_child_balance(AccountId(3), 50, 1, THRESHOLD);
        b.add_child_balance(AccountId(2), 200_000, 1, THRESHOLD);
        assert_eq!(a, b);
        assert_ne!(a.child_balances, b.child_balances);
    }
}
