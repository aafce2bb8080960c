use crate::model::GroupId;
use splitease_domain::{MemberId, Money, SplitAllocationError, TokenUnitError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerSourceError {
    #[error("group {0} not found")]
    NotFound(GroupId),
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("member {member} is not part of group {group}")]
    Forbidden { group: GroupId, member: MemberId },
    #[error("payer {0} is not in the group")]
    PayerNotInGroup(MemberId),
    #[error("user {0} is not in the group")]
    MemberNotInGroup(MemberId),
    #[error("user {0} appears more than once in the split")]
    DuplicateParticipant(MemberId),
    #[error("amount must be positive (got {0})")]
    InvalidAmount(Money),
    #[error("member {0} has no wallet address to receive a settlement")]
    MissingWalletAddress(MemberId),
    #[error(transparent)]
    Split(#[from] SplitAllocationError),
    #[error(transparent)]
    TokenUnits(#[from] TokenUnitError),
    #[error(transparent)]
    Source(#[from] LedgerSourceError),
}
