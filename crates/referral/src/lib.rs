//! Referral bonus engine
//!
//! Computes hierarchical referral bonuses over accounts linked by a single
//! referrer relationship:
//! - Builds the referral tree from an ordered account source
//! - Aggregates descendant balances per level and per subtree
//! - Assigns a rank and bonus percentage from fixed threshold rules
//! - Scans qualifying accounts into payout instructions
//!
//! All payout math is integer fixed point, floored toward zero. The engine
//! never applies payouts; callers turn each [`ReferralInfo`] into a transfer.

pub mod balance;
pub mod errors;
pub mod leaf;
pub mod params;
pub mod rank;
pub mod scan;
pub mod tree;

pub use balance::*;
pub use errors::*;
pub use leaf::*;
pub use params::*;
pub use rank::*;
pub use scan::*;
pub use tree::*;

pub use refnet_types::{
    AccountId, AccountRecord, Amount, BonusBps, ChildBalance, Rank, ReferralInfo, PRECISION,
};
