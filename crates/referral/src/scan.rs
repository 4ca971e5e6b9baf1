//! Payout scan and the end-to-end distribution pipeline
//!
//! The scanner walks a ranked tree and emits one [`ReferralInfo`] per
//! qualifying account. [`distribute`] runs build → rank → scan over a fresh
//! snapshot; nothing is applied to balances here, the caller owns the payouts.

use crate::balance::BalanceLookup;
use crate::errors::Result;
use crate::leaf::LeafInfo;
use crate::params::ReferralParams;
use crate::rank::{RankEngine, Rankings, Standing};
use crate::tree::ReferralTree;
use refnet_types::{AccountId, AccountRecord, Amount, ReferralInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub struct Scanner<'a> {
    params: &'a ReferralParams,
}

impl<'a> Scanner<'a> {
    pub fn new(params: &'a ReferralParams) -> Self {
        Self { params }
    }

    /// Payout for one node, if it qualifies.
    pub fn payout_for(&self, leaf: &LeafInfo, standing: Standing) -> Option<ReferralInfo> {
        let params = self.params;
        if leaf.balance < params.qualify_balance_amount() {
            return None;
        }
        if leaf.level_1_partners < params.min_direct_partners {
            return None;
        }

        let bonus = leaf.bonus_value(standing.bonus, params);
        if bonus < 1 {
            return None;
        }

        Some(ReferralInfo::new(
            leaf.account_id,
            bonus,
            standing.rank,
            leaf.attributed_child_balances(standing.bonus, params),
        ))
    }

    /// Payouts for every qualifying node, in pre-order.
    pub fn scan(&self, tree: &ReferralTree, rankings: &Rankings) -> Vec<ReferralInfo> {
        tree.ranked(rankings)
            .filter_map(|ranked| {
                let payout = self.payout_for(ranked.leaf, ranked.standing);
                if let Some(info) = &payout {
                    debug!(
                        target: "referral",
                        "Account {} qualifies: rank {} bonus {} ({} attributed entries)",
                        info.to_account_id,
                        info.rank,
                        info.quantity,
                        info.history.len()
                    );
                }
                payout
            })
            .collect()
    }
}

/// Summary of one distribution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub accounts_seen: usize,
    pub nodes: usize,
    pub skipped_outside_root: usize,
    pub ranked: usize,
    pub qualifying: usize,
    pub total_quantity: Amount,
}

/// Payout instructions produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub payouts: Vec<ReferralInfo>,
    pub stats: DistributionStats,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }

    pub fn payout_for(&self, account: &AccountId) -> Option<&ReferralInfo> {
        self.payouts.iter().find(|p| p.to_account_id == *account)
    }
}

/// Build the referral tree, rank it and scan it for payouts.
pub fn distribute<I, B>(
    accounts: I,
    balances: &B,
    root_account: Option<AccountId>,
    params: &ReferralParams,
) -> Result<Distribution>
where
    I: IntoIterator<Item = AccountRecord>,
    B: BalanceLookup + ?Sized,
{
    params.validate()?;

    let tree = ReferralTree::build(accounts, balances, root_account, params)?;
    let rankings = RankEngine::new(params).assign(&tree);
    let payouts = Scanner::new(params).scan(&tree, &rankings);

    let build = tree.stats();
    let stats = DistributionStats {
        accounts_seen: build.accounts_seen,
        nodes: tree.node_count(),
        skipped_outside_root: build.skipped_outside_root,
        ranked: rankings.ranked_count(),
        qualifying: payouts.len(),
        total_quantity: payouts
            .iter()
            .fold(0, |acc: Amount, p| acc.saturating_add(p.quantity)),
    };

    info!(
        target: "referral",
        "Referral distribution: {} payouts totalling {} across {} nodes ({} ranked)",
        stats.qualifying,
        stats.total_quantity,
        stats.nodes,
        stats.ranked
    );

    Ok(Distribution { payouts, stats })
}
