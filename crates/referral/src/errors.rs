use refnet_types::AccountId;
use thiserror::Error;

/// Errors raised while building or configuring a referral distribution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferralError {
    #[error("account {0} appears more than once in the account source")]
    DuplicateAccount(AccountId),

    #[error("account {0} is not part of the referral tree")]
    UnknownAccount(AccountId),

    #[error("invalid referral parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("rank bands must be ordered by ascending partner bound")]
    UnsortedBands,
}

pub type Result<T> = std::result::Result<T, ReferralError>;
