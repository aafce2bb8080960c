pub mod balance_calculator;
pub mod debt_simplifier;
pub mod settlement_rounding;
pub mod split_allocator;

pub use balance_calculator::{BalanceAccumulator, BalanceCalculator};
pub use debt_simplifier::DebtSimplifier;
pub use settlement_rounding::{
    MAX_TOKEN_DECIMALS, SETTLED_EPSILON, TokenAmount, TokenUnitError, round_balances,
};
pub use split_allocator::{SplitAllocationError, SplitAllocator};
