//! Deterministic fixed-point helpers for bonus percentages and payout rates.
//!
//! Percentages are stored in basis points (`BPS_SCALE = 10_000`) so that
//! `1.0 == 10_000`, `0.25 == 2_500` and `0.0065 == 65`. Every payout amount is
//! derived with integer math over a `u128` intermediate and floored toward zero,
//! so independent executions always agree on the result.

use crate::account::Amount;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Scale applied to basis point values (ten thousand bps == 1.0).
pub const BPS_SCALE: u32 = 10_000;

/// Safe multiplication followed by division using a u128 intermediate.
/// Returns None if the divisor is zero or the product overflows.
#[inline]
pub fn mul_div_u128(n: u128, mul: u128, div: u128) -> Option<u128> {
    if div == 0 {
        return None;
    }
    n.checked_mul(mul).map(|product| product / div)
}

/// Bonus percentage granted to a ranked account, in basis points.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BonusBps(pub u32);

impl BonusBps {
    /// No bonus (unranked accounts).
    pub const ZERO: BonusBps = BonusBps(0);

    pub const fn new(bps: u32) -> Self {
        Self(bps)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// A percentage is valid when it does not exceed 100%.
    pub const fn is_valid(self) -> bool {
        self.0 <= BPS_SCALE
    }

    /// Human-readable fraction (`2500` renders as `0.25`).
    pub fn as_fraction(self) -> BpsDisplay {
        format_bps(self.0)
    }
}

impl fmt::Display for BonusBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_fraction())
    }
}

/// Scale `amount` by `rate_bps` and `bonus`, flooring toward zero.
///
/// Computes `amount × rate × bonus / BPS_SCALE²`. The result is clamped to
/// `Amount::MAX`; with `u64` inputs and percentages ≤ 100% it never exceeds
/// `amount`.
pub fn apply_rate(amount: Amount, rate_bps: u32, bonus: BonusBps) -> Amount {
    let factor = (rate_bps as u128) * (bonus.get() as u128);
    let denom = (BPS_SCALE as u128) * (BPS_SCALE as u128);
    mul_div_u128(amount as u128, factor, denom)
        .map(|scaled| scaled.min(Amount::MAX as u128) as Amount)
        .unwrap_or(Amount::MAX)
}

/// Format basis points as a decimal fraction without using floats.
pub fn format_bps(bps: u32) -> BpsDisplay {
    BpsDisplay { bps }
}

/// Display helper returned by [`format_bps`].
pub struct BpsDisplay {
    bps: u32,
}

impl fmt::Display for BpsDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.bps / BPS_SCALE;
        let fractional = self.bps % BPS_SCALE;

        if fractional == 0 {
            write!(f, "{}", whole)
        } else {
            let mut frac_str = format!("{fractional:04}");
            while frac_str.ends_with('0') {
                frac_str.pop();
            }
            write!(f, "{}.{}", whole, frac_str)
        }
    }
}
