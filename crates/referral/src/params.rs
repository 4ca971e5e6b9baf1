//! Thresholds and rank bands controlling qualification and bonus size.
//!
//! Balance thresholds are expressed in display units and scaled by
//! `precision` when compared against base-unit balances.

use crate::errors::{ReferralError, Result};
use refnet_types::{Amount, BonusBps, Rank, BPS_SCALE, PRECISION};
use serde::{Deserialize, Serialize};

/// One breadth band of the deep-network rank table.
///
/// A band covers every `all_partners` count below `below_partners`
/// (and at or above the previous band's bound). `None` is unbounded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBand {
    pub below_partners: Option<u32>,
    /// Minimum own balance, in display units.
    pub min_balance: u64,
    pub rank: Rank,
    pub bonus: BonusBps,
}

impl RankBand {
    pub fn new(below_partners: Option<u32>, min_balance: u64, rank: Rank, bonus_bps: u32) -> Self {
        Self {
            below_partners,
            min_balance,
            rank,
            bonus: BonusBps(bonus_bps),
        }
    }

    pub fn contains(&self, all_partners: u32) -> bool {
        self.below_partners.map_or(true, |bound| all_partners < bound)
    }
}

/// Parameters of the referral bonus computation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralParams {
    /// Base units per display unit.
    pub precision: Amount,
    /// Minimum descendant balance (display units) to count as a partner.
    pub partner_threshold: u64,
    /// Minimum own balance (display units) to be ranked or paid.
    pub qualify_balance: u64,
    /// Minimum number of direct partners to be ranked or paid.
    pub min_direct_partners: u32,
    /// Second-level partner count from which the deep-network bands apply.
    pub deep_network_partners: u32,
    /// Minimum own balance (display units) for any deep-network band.
    pub deep_min_balance: u64,
    /// Rank granted to qualifying accounts with a shallow network.
    pub direct_rank: Rank,
    /// Bonus granted with `direct_rank`; every band bonus must be lower.
    /// Accounts at or above this percentage only attribute direct referrals
    /// in their payout history.
    pub direct_bonus: BonusBps,
    /// Deep-network bands, ordered by ascending `below_partners`.
    pub bands: Vec<RankBand>,
    /// Share of the referred balance paid out before the rank bonus (65 = 0.0065).
    pub payout_rate_bps: u32,
}

impl Default for ReferralParams {
    fn default() -> Self {
        Self {
            precision: PRECISION,
            partner_threshold: 100,
            qualify_balance: 200,
            min_direct_partners: 5,
            deep_network_partners: 25,
            deep_min_balance: 500,
            direct_rank: Rank::A,
            direct_bonus: BonusBps(2_500),
            bands: vec![
                RankBand::new(Some(125), 500, Rank::B, 2_000),
                RankBand::new(Some(625), 1_000, Rank::C, 1_500),
                RankBand::new(Some(3_125), 2_000, Rank::D, 1_000),
                RankBand::new(Some(15_625), 3_000, Rank::E, 500),
                RankBand::new(Some(78_125), 4_000, Rank::F, 250),
                RankBand::new(None, 5_000, Rank::G, 250),
            ],
            payout_rate_bps: 65,
        }
    }
}

impl ReferralParams {
    /// Scale a display-unit threshold to base units.
    pub fn amount(&self, display: u64) -> Amount {
        display.saturating_mul(self.precision)
    }

    pub fn partner_threshold_amount(&self) -> Amount {
        self.amount(self.partner_threshold)
    }

    pub fn qualify_balance_amount(&self) -> Amount {
        self.amount(self.qualify_balance)
    }

    pub fn deep_min_balance_amount(&self) -> Amount {
        self.amount(self.deep_min_balance)
    }

    /// First band whose partner bound covers `all_partners`.
    pub fn band_for(&self, all_partners: u32) -> Option<&RankBand> {
        self.bands.iter().find(|band| band.contains(all_partners))
    }

    /// Reject parameter sets that would make ranking ambiguous or overpay.
    pub fn validate(&self) -> Result<()> {
        if self.precision == 0 {
            return Err(ReferralError::InvalidParameter("precision must be positive"));
        }
        if self.min_direct_partners == 0 {
            return Err(ReferralError::InvalidParameter(
                "min_direct_partners must be positive",
            ));
        }
        if self.payout_rate_bps > BPS_SCALE {
            return Err(ReferralError::InvalidParameter(
                "payout_rate_bps must not exceed 10000",
            ));
        }
        if !self.direct_bonus.is_valid() || !self.direct_rank.is_ranked() {
            return Err(ReferralError::InvalidParameter(
                "direct tier needs a rank and a bonus of at most 10000 bps",
            ));
        }
        if self.bands.is_empty() {
            return Err(ReferralError::InvalidParameter("rank band table is empty"));
        }

        let mut previous: Option<u32> = None;
        for (i, band) in self.bands.iter().enumerate() {
            if !band.bonus.is_valid() || !band.rank.is_ranked() {
                return Err(ReferralError::InvalidParameter(
                    "each band needs a rank and a bonus of at most 10000 bps",
                ));
            }
            if band.bonus >= self.direct_bonus {
                return Err(ReferralError::InvalidParameter(
                    "band bonuses must be below the direct tier bonus",
                ));
            }
            let last = i + 1 == self.bands.len();
            match (band.below_partners, last) {
                (None, true) => {}
                (None, false) => return Err(ReferralError::UnsortedBands),
                (Some(_), true) => {
                    return Err(ReferralError::InvalidParameter(
                        "last rank band must be unbounded",
                    ))
                }
                (Some(bound), false) => {
                    if previous.is_some_and(|prev| bound <= prev) {
                        return Err(ReferralError::UnsortedBands);
                    }
                    previous = Some(bound);
                }
            }
        }

        Ok(())
    }
}
