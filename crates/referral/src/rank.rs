//! Rank assignment
//!
//! Ranking is a separate pass over a finished tree. It reads each node's
//! aggregates and produces an immutable [`Rankings`] table; the tree itself
//! is never modified.

use crate::leaf::LeafInfo;
use crate::params::ReferralParams;
use crate::tree::{NodeId, ReferralTree};
use refnet_types::{AccountId, Amount, BonusBps, ChildBalance, Rank};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rank and bonus percentage held by one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub rank: Rank,
    pub bonus: BonusBps,
}

impl Standing {
    pub const UNRANKED: Standing = Standing {
        rank: Rank::Unranked,
        bonus: BonusBps::ZERO,
    };

    pub fn new(rank: Rank, bonus: BonusBps) -> Self {
        Self { rank, bonus }
    }

    pub fn is_ranked(&self) -> bool {
        self.rank.is_ranked()
    }
}

pub struct RankEngine<'a> {
    params: &'a ReferralParams,
}

impl<'a> RankEngine<'a> {
    pub fn new(params: &'a ReferralParams) -> Self {
        Self { params }
    }

    /// Standing of a single node, from its own aggregates only.
    ///
    /// Shallow networks get the direct tier. Deep networks are banded by
    /// `all_partners`; a node missing its band's balance floor stays unranked
    /// rather than falling back to a lower band.
    pub fn rank_leaf(&self, leaf: &LeafInfo) -> Standing {
        let params = self.params;
        if !leaf.meets_qualifying_gate(params) {
            return Standing::UNRANKED;
        }
        if !leaf.has_deep_network(params) {
            return Standing::new(params.direct_rank, params.direct_bonus);
        }
        if leaf.balance < params.deep_min_balance_amount() {
            return Standing::UNRANKED;
        }

        match params.band_for(leaf.all_partners) {
            Some(band) if leaf.balance >= params.amount(band.min_balance) => {
                Standing::new(band.rank, band.bonus)
            }
            _ => Standing::UNRANKED,
        }
    }

    /// Rank every node of `tree`.
    pub fn assign(&self, tree: &ReferralTree) -> Rankings {
        let standings: Vec<Standing> = tree
            .iter()
            .map(|(_, node)| self.rank_leaf(node.leaf()))
            .collect();
        let ranked = standings.iter().filter(|s| s.is_ranked()).count();

        debug!(
            target: "referral",
            "Ranked {} of {} nodes",
            ranked,
            standings.len()
        );

        Rankings { standings, ranked }
    }
}

/// Standings of every node of one tree, indexed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rankings {
    standings: Vec<Standing>,
    ranked: usize,
}

impl Rankings {
    /// Standing of `id`; unranked for ids outside the table.
    pub fn standing(&self, id: NodeId) -> Standing {
        self.standings
            .get(id.index())
            .copied()
            .unwrap_or(Standing::UNRANKED)
    }

    pub fn standing_of(&self, tree: &ReferralTree, account: &AccountId) -> Option<Standing> {
        tree.find(account).map(|id| self.standing(id))
    }

    /// Number of nodes holding a rank.
    pub fn ranked_count(&self) -> usize {
        self.ranked
    }

    pub fn len(&self) -> usize {
        self.standings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }
}

/// A node's aggregates together with its standing.
#[derive(Debug, Clone, Copy)]
pub struct RankedLeaf<'a> {
    pub id: NodeId,
    pub leaf: &'a LeafInfo,
    pub standing: Standing,
}

impl<'a> RankedLeaf<'a> {
    pub fn rank(&self) -> Rank {
        self.standing.rank
    }

    pub fn bonus(&self) -> BonusBps {
        self.standing.bonus
    }

    pub fn bonus_value(&self, params: &ReferralParams) -> Amount {
        self.leaf.bonus_value(self.standing.bonus, params)
    }

    pub fn child_balances(&self, params: &ReferralParams) -> Vec<ChildBalance> {
        self.leaf
            .attributed_child_balances(self.standing.bonus, params)
    }
}

impl ReferralTree {
    /// Pre-order view of every node merged with its standing.
    pub fn ranked<'a>(
        &'a self,
        rankings: &'a Rankings,
    ) -> impl Iterator<Item = RankedLeaf<'a>> + 'a {
        self.preorder().map(move |(id, node)| RankedLeaf {
            id,
            leaf: node.leaf(),
            standing: rankings.standing(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refnet_types::units;

    fn leaf(balance: u64, l1: u32, l2: u32, all: u32) -> LeafInfo {
        LeafInfo {
            account_id: AccountId(1),
            balance: units(balance),
            level_1_partners: l1,
            level_2_partners: l2,
            all_partners: all,
            ..Default::default()
        }
    }

    fn rank_of(leaf: &LeafInfo) -> Standing {
        let params = ReferralParams::default();
        RankEngine::new(&params).rank_leaf(leaf)
    }

    #[test]
    fn test_qualifying_gate() {
        assert_eq!(rank_of(&leaf(199, 10, 0, 10)), Standing::UNRANKED);
        assert_eq!(rank_of(&leaf(100, 10, 0, 10)), Standing::UNRANKED);
        assert_eq!(rank_of(&leaf(10_000, 4, 30, 200)), Standing::UNRANKED);
    }

    #[test]
    fn test_direct_tier() {
        let standing = rank_of(&leaf(200, 5, 0, 5));
        assert_eq!(standing, Standing::new(Rank::A, BonusBps(2_500)));

        let standing = rank_of(&leaf(200, 5, 24, 29));
        assert_eq!(standing.rank, Rank::A);
    }

    #[test]
    fn test_deep_network_needs_minimum_balance() {
        // 30 second-level partners but only 400 units: no fallback to A.
        assert_eq!(rank_of(&leaf(400, 5, 30, 35)), Standing::UNRANKED);
        assert_eq!(
            rank_of(&leaf(500, 5, 30, 35)),
            Standing::new(Rank::B, BonusBps(2_000))
        );
    }

    #[test]
    fn test_bands() {
        let cases = [
            (500, 124, Rank::B, 2_000),
            (1_000, 125, Rank::C, 1_500),
            (2_000, 625, Rank::D, 1_000),
            (3_000, 3_125, Rank::E, 500),
            (4_000, 15_625, Rank::F, 250),
            (5_000, 78_125, Rank::G, 250),
        ];
        for (balance, all, rank, bps) in cases {
            assert_eq!(
                rank_of(&leaf(balance, 5, 25, all)),
                Standing::new(rank, BonusBps(bps)),
                "band for {all} partners"
            );
        }
    }

    #[test]
    fn test_band_floor_does_not_fall_back() {
        assert_eq!(rank_of(&leaf(999, 5, 25, 200)), Standing::UNRANKED);
        assert_eq!(rank_of(&leaf(1_999, 5, 25, 700)), Standing::UNRANKED);
        assert_eq!(rank_of(&leaf(4_999, 5, 25, 100_000)), Standing::UNRANKED);
    }

    #[test]
    fn test_rankings_table() {
        use crate::balance::InMemoryBalanceBook;
        use refnet_types::AccountRecord;

        let params = ReferralParams::default();
        let mut balances = InMemoryBalanceBook::new();
        balances.set(AccountId(1), units(200));
        let mut accounts = vec![AccountRecord::orphan(1)];
        for id in 2..7 {
            balances.set(AccountId(id), units(300));
            accounts.push(AccountRecord::new(id, 1));
        }

        let tree = ReferralTree::build(accounts, &balances, None, &params).unwrap();
        let rankings = RankEngine::new(&params).assign(&tree);

        assert_eq!(rankings.len(), tree.node_count());
        assert_eq!(rankings.ranked_count(), 1);
        assert_eq!(
            rankings.standing_of(&tree, &AccountId(1)),
            Some(Standing::new(Rank::A, BonusBps(2_500)))
        );
        assert_eq!(
            rankings.standing_of(&tree, &AccountId(2)),
            Some(Standing::UNRANKED)
        );
        assert_eq!(rankings.standing_of(&tree, &AccountId(42)), None);

        let ranked: Vec<RankedLeaf<'_>> = tree.ranked(&rankings).collect();
        assert_eq!(ranked.len(), tree.node_count());
        let one = ranked
            .iter()
            .find(|r| r.leaf.account_id == AccountId(1))
            .unwrap();
        assert_eq!(one.rank(), Rank::A);
        assert_eq!(one.bonus_value(&params), 2_437);
        assert_eq!(one.child_balances(&params).len(), 5);
    }
}
