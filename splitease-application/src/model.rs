use indexmap::IndexMap;
use splitease_domain::{
    Expense, MemberDirectory, MemberId, MemberInfo, Money, SettlementRecord, SimplifiedDebt,
    SplitKind, SplitLine, SplitPolicy, TokenAmount,
};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMember {
    pub id: MemberId,
    pub info: MemberInfo,
}

/// Snapshot of everything the ledger needs for one group, as loaded from the
/// store.
#[derive(Clone, Debug)]
pub struct GroupLedger {
    pub id: GroupId,
    pub name: String,
    roster: IndexMap<MemberId, MemberInfo>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<SettlementRecord>,
    pub payment_requests: Vec<PaymentRequestRecord>,
}

impl GroupLedger {
    pub fn new<I>(id: GroupId, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = GroupMember>,
    {
        Self {
            id,
            name: name.into(),
            roster: members
                .into_iter()
                .map(|member| (member.id, member.info))
                .collect(),
            expenses: Vec::new(),
            settlements: Vec::new(),
            payment_requests: Vec::new(),
        }
    }

    pub fn with_expenses(mut self, expenses: Vec<Expense>) -> Self {
        self.expenses = expenses;
        self
    }

    pub fn with_settlements(mut self, settlements: Vec<SettlementRecord>) -> Self {
        self.settlements = settlements;
        self
    }

    pub fn with_payment_requests(mut self, payment_requests: Vec<PaymentRequestRecord>) -> Self {
        self.payment_requests = payment_requests;
        self
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.roster.contains_key(member)
    }

    /// Member ids in roster order.
    pub fn member_ids(&self) -> impl Iterator<Item = &MemberId> + '_ {
        self.roster.keys()
    }

    pub fn member_count(&self) -> usize {
        self.roster.len()
    }

    pub fn total_expenses(&self) -> Money {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }
}

impl MemberDirectory for GroupLedger {
    fn member_info(&self, member: &MemberId) -> Option<&MemberInfo> {
        self.roster.get(member)
    }
}

/// Expense as submitted by a member, before allocation.
///
/// An `Equal` policy with no participants splits across the whole roster.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDraft {
    pub payer: MemberId,
    pub amount: Money,
    pub split: SplitPolicy,
}

/// Allocated expense ready to be persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedExpense {
    pub payer: MemberId,
    pub amount: Money,
    pub kind: SplitKind,
    pub splits: Vec<SplitLine>,
}

impl PlannedExpense {
    pub fn into_expense(self) -> Expense {
        Expense {
            payer: self.payer,
            amount: self.amount,
            splits: self.splits,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBalanceRow {
    pub member: MemberId,
    pub name: String,
    pub wallet_address: Option<String>,
    /// Rounded to cents.
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupBalanceView {
    pub group_id: GroupId,
    pub group_name: String,
    pub viewer: MemberId,
    pub balances: Vec<MemberBalanceRow>,
    pub simplified_debts: Vec<SimplifiedDebt>,
}

impl GroupBalanceView {
    pub fn viewer_balance(&self) -> Money {
        self.balances
            .iter()
            .find(|row| row.member == self.viewer)
            .map_or(Money::ZERO, |row| row.balance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSummary {
    pub group_id: GroupId,
    pub group_name: String,
    pub member_count: usize,
    /// Viewer's rounded balance in this group.
    pub balance: Money,
    pub total_expenses: Money,
}

/// Pending payment requests touching the viewer, across all their groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSummary {
    /// Requests asking the viewer to pay.
    pub incoming_count: usize,
    pub incoming_total: Money,
    /// Requests the viewer sent.
    pub outgoing_count: usize,
    pub outgoing_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardSummary {
    pub viewer: MemberId,
    pub total_owed: Money,
    pub total_owing: Money,
    pub groups: Vec<GroupSummary>,
    pub requests: RequestSummary,
}

/// On-chain transfer the viewer has to submit to settle one debt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferInstruction {
    pub to: MemberId,
    pub to_name: String,
    pub to_wallet: String,
    pub amount: Money,
    pub token_amount: TokenAmount,
}

/// Prefilled request asking a debtor to pay the viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequestDraft {
    pub group_id: GroupId,
    pub requester: MemberId,
    pub debtor: MemberId,
    pub debtor_name: String,
    pub amount: Money,
}

impl PaymentRequestDraft {
    /// The request as stored once sent; it starts out pending.
    pub fn into_record(self) -> PaymentRequestRecord {
        PaymentRequestRecord {
            from: self.requester,
            to: self.debtor,
            amount: self.amount,
            status: PaymentRequestStatus::Pending,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentRequestStatus {
    Pending,
    Paid,
    Declined,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment request status `{0}`")]
pub struct UnknownPaymentRequestStatus(pub String);

impl FromStr for PaymentRequestStatus {
    type Err = UnknownPaymentRequestStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentRequestStatus::Pending),
            "PAID" => Ok(PaymentRequestStatus::Paid),
            "DECLINED" => Ok(PaymentRequestStatus::Declined),
            "CANCELLED" => Ok(PaymentRequestStatus::Cancelled),
            other => Err(UnknownPaymentRequestStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for PaymentRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentRequestStatus::Pending => "PENDING",
            PaymentRequestStatus::Paid => "PAID",
            PaymentRequestStatus::Declined => "DECLINED",
            PaymentRequestStatus::Cancelled => "CANCELLED",
        })
    }
}

/// A request from `from` asking `to` to pay `amount`. Never affects balances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequestRecord {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub status: PaymentRequestStatus,
}
