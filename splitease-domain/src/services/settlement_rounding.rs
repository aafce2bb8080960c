//! Cent rounding at the engine boundary and conversion of settled amounts into
//! on-chain token base units.
//!
//! Balances are accumulated unrounded and only rounded here, at the point of
//! external consumption, so repeated splits do not compound rounding error.

use crate::model::{MemberBalances, Money};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Balances whose magnitude does not exceed one cent are treated as settled.
pub const SETTLED_EPSILON: Money = Money::from_decimal(Decimal::from_parts(1, 0, 0, false, 2));

/// Largest token precision whose scaling factor still fits in `u128`.
pub const MAX_TOKEN_DECIMALS: u32 = 36;

/// Rounds every balance to whole cents.
pub fn round_balances(balances: &MemberBalances) -> MemberBalances {
    balances
        .iter()
        .map(|(member, balance)| (member.clone(), balance.round_to_cents()))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TokenUnitError {
    #[error("token amounts cannot be negative")]
    Negative,
    #[error("amount has more fractional digits than the token's {decimals} decimals")]
    NonIntegral { decimals: u32 },
    #[error("amount does not fit into token base units")]
    Overflow,
    #[error("token decimals {decimals} exceed the supported maximum of {max_supported}")]
    UnsupportedDecimals { decimals: u32, max_supported: u32 },
}

/// An amount in the integer base units of an ERC-20 style token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// Scales `amount` by `10^decimals`. The conversion is exact or it fails.
    pub fn from_money(amount: Money, decimals: u32) -> Result<Self, TokenUnitError> {
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(TokenUnitError::UnsupportedDecimals {
                decimals,
                max_supported: MAX_TOKEN_DECIMALS,
            });
        }

        let value = amount.as_decimal().normalize();
        if value < Decimal::ZERO {
            return Err(TokenUnitError::Negative);
        }
        if value.scale() > decimals {
            return Err(TokenUnitError::NonIntegral { decimals });
        }

        let mantissa = u128::try_from(value.mantissa()).map_err(|_| TokenUnitError::Negative)?;
        let factor = 10_u128
            .checked_pow(decimals - value.scale())
            .ok_or(TokenUnitError::Overflow)?;
        mantissa
            .checked_mul(factor)
            .map(Self)
            .ok_or(TokenUnitError::Overflow)
    }

    pub fn units(self) -> u128 {
        self.0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberId;
    use rstest::rstest;

    #[test]
    fn settled_epsilon_is_one_cent() {
        assert_eq!(SETTLED_EPSILON, Money::from_cents(1));
    }

    #[test]
    fn round_balances_rounds_each_entry() {
        let balances = MemberBalances::from_iter([
            (MemberId::from("a"), Money::new(66_665, 4)),
            (MemberId::from("b"), Money::new(-66_665, 4)),
        ]);

        let rounded = round_balances(&balances);

        assert_eq!(rounded[&MemberId::from("a")], Money::from_cents(667));
        assert_eq!(rounded[&MemberId::from("b")], Money::from_cents(-667));
    }

    #[rstest]
    #[case::six_decimals(Money::from_cents(1234), 6, 12_340_000)]
    #[case::eighteen_decimals(Money::from_cents(1), 18, 10_000_000_000_000_000)]
    #[case::whole_amount_zero_decimals(Money::new(5, 0), 0, 5)]
    #[case::trailing_zeros_are_ignored(Money::new(500, 2), 0, 5)]
    #[case::zero(Money::ZERO, 6, 0)]
    fn converts_to_token_units(
        #[case] amount: Money,
        #[case] decimals: u32,
        #[case] expected: u128,
    ) {
        let converted = TokenAmount::from_money(amount, decimals).expect("conversion succeeds");
        assert_eq!(converted.units(), expected);
    }

    #[rstest]
    #[case::negative(Money::from_cents(-1), 6, TokenUnitError::Negative)]
    #[case::non_integral(Money::from_cents(1), 1, TokenUnitError::NonIntegral { decimals: 1 })]
    #[case::unsupported(
        Money::from_cents(1),
        37,
        TokenUnitError::UnsupportedDecimals { decimals: 37, max_supported: 36 }
    )]
    fn rejects_unrepresentable_token_amounts(
        #[case] amount: Money,
        #[case] decimals: u32,
        #[case] expected: TokenUnitError,
    ) {
        assert_eq!(TokenAmount::from_money(amount, decimals), Err(expected));
    }

    #[test]
    fn large_amounts_overflow_at_max_decimals() {
        let amount = Money::new(1_000_000, 0);
        assert_eq!(
            TokenAmount::from_money(amount, MAX_TOKEN_DECIMALS),
            Err(TokenUnitError::Overflow)
        );
    }
}
