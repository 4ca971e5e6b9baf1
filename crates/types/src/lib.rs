//! Referral network primitive types.
//!
//! Account identifiers and balance units, fixed-point percentage helpers, and
//! the records exchanged between the bonus engine and payout consumers.

pub mod account;
pub mod referral;
pub mod scalars;

pub use account::*;
pub use referral::*;
pub use scalars::*;
