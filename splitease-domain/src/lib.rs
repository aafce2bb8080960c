#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    CENT_SCALE, Expense, MemberBalances, MemberDirectory, MemberId, MemberInfo, Money,
    SettlementRecord, SettlementStatus, SimplifiedDebt, SplitKind, SplitLine, SplitPolicy,
    SplitShare, Transfer, UNKNOWN_MEMBER_NAME, UnknownSettlementStatus,
};
pub use services::{
    BalanceAccumulator, BalanceCalculator, DebtSimplifier, SplitAllocationError, SplitAllocator,
    TokenAmount, TokenUnitError, round_balances,
};
