use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};
use thiserror::Error;

/// Number of decimal places carried by application-level amounts.
pub const CENT_SCALE: u32 = 2;

/// Display name substituted when a member cannot be resolved.
pub const UNKNOWN_MEMBER_NAME: &str = "Unknown";

/// Opaque member identifier as issued by the user store.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for MemberId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Base-10 fixed-point monetary amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// `num * 10^-scale`, e.g. `Money::new(1234, 2)` is 12.34.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub const fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn from_cents(cents: i64) -> Self {
        Self::new(cents, CENT_SCALE)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Rounds to whole cents, with midpoints going toward positive infinity
    /// (`-0.005` becomes `0.00`, `0.005` becomes `0.01`).
    pub fn round_to_cents(self) -> Self {
        let strategy = if self.0.is_sign_negative() {
            RoundingStrategy::MidpointTowardZero
        } else {
            RoundingStrategy::MidpointAwayFromZero
        };
        let mut rounded = self.0.round_dp_with_strategy(CENT_SCALE, strategy);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        Self(rounded)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cents = self.round_to_cents().0;
        cents.rescale(CENT_SCALE);
        write!(f, "{cents}")
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Net balance per member, in the order each member first appears in the
/// history. Tie-breaks downstream follow this order.
pub type MemberBalances = IndexMap<MemberId, Money>;

/// Rule used to divide an expense among participants.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitPolicy {
    /// Even split; the first participant absorbs the rounding remainder.
    Equal(Vec<MemberId>),
    /// Caller-supplied owed amount per member.
    Exact(Vec<(MemberId, Money)>),
    /// Caller-supplied percentage per member.
    Percentage(Vec<(MemberId, Decimal)>),
}

impl SplitPolicy {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitPolicy::Equal(_) => SplitKind::Equal,
            SplitPolicy::Exact(_) => SplitKind::Exact,
            SplitPolicy::Percentage(_) => SplitKind::Percentage,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Equal,
    Exact,
    Percentage,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitKind::Equal => "EQUAL",
            SplitKind::Exact => "EXACT",
            SplitKind::Percentage => "PERCENTAGE",
        })
    }
}

/// One member's owed amount as produced by the allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitShare {
    pub member: MemberId,
    pub amount: Money,
}

/// Persisted split row of an expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitLine {
    pub member: MemberId,
    pub amount: Money,
    pub is_paid: bool,
}

impl SplitLine {
    pub fn new(member: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            member: member.into(),
            amount,
            is_paid: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub payer: MemberId,
    pub amount: Money,
    pub splits: Vec<SplitLine>,
}

impl Expense {
    pub fn split_total(&self) -> Money {
        self.splits.iter().map(|split| split.amount).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettlementStatus {
    Pending,
    Confirmed,
    Failed,
}

impl SettlementStatus {
    pub fn counts_toward_balance(self) -> bool {
        matches!(self, SettlementStatus::Confirmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown settlement status `{0}`")]
pub struct UnknownSettlementStatus(pub String);

impl FromStr for SettlementStatus {
    type Err = UnknownSettlementStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SettlementStatus::Pending),
            "CONFIRMED" => Ok(SettlementStatus::Confirmed),
            "FAILED" => Ok(SettlementStatus::Failed),
            other => Err(UnknownSettlementStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SettlementStatus::Pending => "PENDING",
            SettlementStatus::Confirmed => "CONFIRMED",
            SettlementStatus::Failed => "FAILED",
        })
    }
}

/// A recorded value transfer between two members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementRecord {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub status: SettlementStatus,
    pub tx_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: Option<String>,
    pub wallet_address: Option<String>,
}

/// A simplified debt edge joined with display metadata of both parties.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimplifiedDebt {
    pub from: MemberId,
    pub from_name: String,
    pub from_wallet: Option<String>,
    pub to: MemberId,
    pub to_name: String,
    pub to_wallet: Option<String>,
    pub amount: Money,
}

/// Best-effort lookup of member display metadata.
pub trait MemberDirectory {
    fn member_info(&self, member: &MemberId) -> Option<&MemberInfo>;

    fn display_name(&self, member: &MemberId) -> &str {
        self.member_info(member)
            .and_then(|info| info.name.as_deref())
            .unwrap_or(UNKNOWN_MEMBER_NAME)
    }

    fn wallet_address(&self, member: &MemberId) -> Option<&str> {
        self.member_info(member)
            .and_then(|info| info.wallet_address.as_deref())
    }
}

impl MemberDirectory for HashMap<MemberId, MemberInfo> {
    fn member_info(&self, member: &MemberId) -> Option<&MemberInfo> {
        self.get(member)
    }
}

impl MemberDirectory for BTreeMap<MemberId, MemberInfo> {
    fn member_info(&self, member: &MemberId) -> Option<&MemberInfo> {
        self.get(member)
    }
}
