use crate::{
    error::LedgerError,
    model::{
        DashboardSummary, ExpenseDraft, GroupBalanceView, GroupId, GroupLedger, GroupSummary,
        MemberBalanceRow, PaymentRequestDraft, PaymentRequestRecord, PaymentRequestStatus,
        PlannedExpense, RequestSummary, TransferInstruction,
    },
    ports::GroupLedgerSource,
};
use fxhash::FxHashSet;
use splitease_domain::{
    BalanceCalculator, DebtSimplifier, Expense, MemberDirectory, MemberId, Money,
    SplitAllocationError, SplitAllocator, SplitLine, SplitPolicy, TokenAmount, round_balances,
    services::SETTLED_EPSILON,
};

/// Group-ledger use cases on top of the split allocator and balance engine.
#[derive(Clone, Copy)]
pub struct LedgerService<'a> {
    source: &'a dyn GroupLedgerSource,
}

impl<'a> LedgerService<'a> {
    pub fn new(source: &'a dyn GroupLedgerSource) -> Self {
        Self { source }
    }

    pub fn plan_expense(
        &self,
        group_id: &GroupId,
        draft: &ExpenseDraft,
    ) -> Result<PlannedExpense, LedgerError> {
        let ledger = self.source.load_group(group_id)?;
        Self::plan_expense_in(&ledger, draft)
    }

    pub fn group_balances(
        &self,
        group_id: &GroupId,
        viewer: &MemberId,
    ) -> Result<GroupBalanceView, LedgerError> {
        let ledger = self.source.load_group(group_id)?;
        Self::balance_view_of(&ledger, viewer)
    }

    /// Aggregates the viewer's position across every group they belong to.
    pub fn dashboard(&self, viewer: &MemberId) -> Result<DashboardSummary, LedgerError> {
        let group_ids = self.source.groups_of(viewer)?;
        let mut groups = Vec::with_capacity(group_ids.len());
        let mut total_owed = Money::ZERO;
        let mut total_owing = Money::ZERO;
        let mut requests = RequestSummary::default();

        for group_id in &group_ids {
            let ledger = self.source.load_group(group_id)?;
            let summary = Self::summarize_group(&ledger, viewer);
            if summary.balance.is_positive() {
                total_owed += summary.balance;
            } else {
                total_owing += summary.balance.abs();
            }
            groups.push(summary);
            Self::tally_pending_requests(&ledger, viewer, &mut requests);
        }
        requests.incoming_total = requests.incoming_total.round_to_cents();
        requests.outgoing_total = requests.outgoing_total.round_to_cents();

        tracing::debug!(
            viewer = %viewer,
            group_count = groups.len(),
            total_owed = %total_owed,
            total_owing = %total_owing,
            incoming_requests = requests.incoming_count,
            outgoing_requests = requests.outgoing_count,
            "Dashboard aggregated"
        );

        Ok(DashboardSummary {
            viewer: viewer.clone(),
            total_owed: total_owed.round_to_cents(),
            total_owing: total_owing.round_to_cents(),
            groups,
            requests,
        })
    }

    /// Adds the group's pending requests addressed to or sent by `viewer`.
    fn tally_pending_requests(ledger: &GroupLedger, viewer: &MemberId, into: &mut RequestSummary) {
        let pending = ledger
            .payment_requests
            .iter()
            .filter(|request| request.status == PaymentRequestStatus::Pending);
        for request in pending {
            if &request.to == viewer {
                into.incoming_count += 1;
                into.incoming_total += request.amount;
            }
            if &request.from == viewer {
                into.outgoing_count += 1;
                into.outgoing_total += request.amount;
            }
        }
    }

    /// Validates a draft against the group roster and allocates its splits.
    pub fn plan_expense_in(
        ledger: &GroupLedger,
        draft: &ExpenseDraft,
    ) -> Result<PlannedExpense, LedgerError> {
        if !draft.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(draft.amount));
        }
        if !ledger.is_member(&draft.payer) {
            return Err(LedgerError::PayerNotInGroup(draft.payer.clone()));
        }

        let roster_split;
        let policy = match &draft.split {
            SplitPolicy::Equal(participants) if participants.is_empty() => {
                roster_split = SplitPolicy::Equal(ledger.member_ids().cloned().collect());
                &roster_split
            }
            policy => policy,
        };
        reject_duplicate_participants(policy)?;

        let shares = SplitAllocator.allocate(draft.amount, policy)?;
        if let Some(outsider) = shares.iter().find(|share| !ledger.is_member(&share.member)) {
            return Err(LedgerError::MemberNotInGroup(outsider.member.clone()));
        }

        tracing::debug!(
            group_id = %ledger.id,
            payer = %draft.payer,
            amount = %draft.amount,
            kind = %policy.kind(),
            share_count = shares.len(),
            "Expense splits planned"
        );

        let splits = shares
            .into_iter()
            .map(|share| SplitLine {
                is_paid: share.member == draft.payer,
                member: share.member,
                amount: share.amount,
            })
            .collect();

        Ok(PlannedExpense {
            payer: draft.payer.clone(),
            amount: draft.amount,
            kind: policy.kind(),
            splits,
        })
    }

    /// Validates an expense whose split lines were decided elsewhere.
    ///
    /// Every line must belong to a roster member at most once, none may be
    /// negative, and together they must match the amount within one cent.
    /// The payer's own line is marked paid.
    pub fn record_expense_in(
        ledger: &GroupLedger,
        expense: Expense,
    ) -> Result<Expense, LedgerError> {
        if !expense.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(expense.amount));
        }
        if !ledger.is_member(&expense.payer) {
            return Err(LedgerError::PayerNotInGroup(expense.payer));
        }
        if expense.splits.is_empty() {
            return Err(SplitAllocationError::EmptyParticipantSet.into());
        }

        let mut seen = FxHashSet::default();
        for line in &expense.splits {
            if !seen.insert(&line.member) {
                return Err(LedgerError::DuplicateParticipant(line.member.clone()));
            }
            if !ledger.is_member(&line.member) {
                return Err(LedgerError::MemberNotInGroup(line.member.clone()));
            }
            if line.amount.is_negative() {
                return Err(SplitAllocationError::NegativeShare {
                    member: line.member.clone(),
                }
                .into());
            }
        }

        let actual = expense.split_total();
        if (actual - expense.amount).abs() > SETTLED_EPSILON {
            return Err(SplitAllocationError::SplitMismatch {
                expected: expense.amount,
                actual,
            }
            .into());
        }

        tracing::debug!(
            group_id = %ledger.id,
            payer = %expense.payer,
            amount = %expense.amount,
            line_count = expense.splits.len(),
            "Pre-split expense recorded"
        );

        let Expense {
            payer,
            amount,
            splits,
        } = expense;
        let splits = splits
            .into_iter()
            .map(|line| SplitLine {
                is_paid: line.is_paid || line.member == payer,
                ..line
            })
            .collect();
        Ok(Expense {
            payer,
            amount,
            splits,
        })
    }

    /// Checks that both sides of a payment request belong to the group.
    pub fn record_payment_request_in(
        ledger: &GroupLedger,
        request: PaymentRequestRecord,
    ) -> Result<PaymentRequestRecord, LedgerError> {
        if !request.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(request.amount));
        }
        if let Some(outsider) = [&request.from, &request.to]
            .into_iter()
            .find(|member| !ledger.is_member(member))
        {
            return Err(LedgerError::MemberNotInGroup(outsider.clone()));
        }
        Ok(request)
    }

    /// Net balances of every roster member plus the simplified debt list.
    pub fn balance_view_of(
        ledger: &GroupLedger,
        viewer: &MemberId,
    ) -> Result<GroupBalanceView, LedgerError> {
        if !ledger.is_member(viewer) {
            tracing::warn!(
                group_id = %ledger.id,
                viewer = %viewer,
                "Balance view requested by a non-member"
            );
            return Err(LedgerError::Forbidden {
                group: ledger.id.clone(),
                member: viewer.clone(),
            });
        }

        let balances = BalanceCalculator.net_balances_for_members(
            ledger.member_ids(),
            &ledger.expenses,
            &ledger.settlements,
        );
        let simplified_debts = DebtSimplifier.simplify_with_directory(&balances, ledger);
        let rounded = round_balances(&balances);

        let rows = ledger
            .member_ids()
            .map(|member| MemberBalanceRow {
                member: member.clone(),
                name: ledger.display_name(member).to_owned(),
                wallet_address: ledger.wallet_address(member).map(str::to_owned),
                balance: rounded.get(member).copied().unwrap_or(Money::ZERO),
            })
            .collect();

        Ok(GroupBalanceView {
            group_id: ledger.id.clone(),
            group_name: ledger.name.clone(),
            viewer: viewer.clone(),
            balances: rows,
            simplified_debts,
        })
    }

    pub fn summarize_group(ledger: &GroupLedger, viewer: &MemberId) -> GroupSummary {
        let balances = BalanceCalculator.net_balances(&ledger.expenses, &ledger.settlements);
        let balance = balances
            .get(viewer)
            .copied()
            .unwrap_or(Money::ZERO)
            .round_to_cents();

        GroupSummary {
            group_id: ledger.id.clone(),
            group_name: ledger.name.clone(),
            member_count: ledger.member_count(),
            balance,
            total_expenses: ledger.total_expenses().round_to_cents(),
        }
    }

    /// Transfers the viewer must submit on-chain, one per debt they owe.
    pub fn settle_up_instructions(
        view: &GroupBalanceView,
        token_decimals: u32,
    ) -> Result<Vec<TransferInstruction>, LedgerError> {
        view.simplified_debts
            .iter()
            .filter(|debt| debt.from == view.viewer)
            .map(|debt| {
                let to_wallet = debt
                    .to_wallet
                    .clone()
                    .ok_or_else(|| LedgerError::MissingWalletAddress(debt.to.clone()))?;
                let token_amount = TokenAmount::from_money(debt.amount, token_decimals)?;
                Ok(TransferInstruction {
                    to: debt.to.clone(),
                    to_name: debt.to_name.clone(),
                    to_wallet,
                    amount: debt.amount,
                    token_amount,
                })
            })
            .collect()
    }

    /// Payment requests the viewer can send, one per debtor owing them.
    pub fn payment_request_prefills(view: &GroupBalanceView) -> Vec<PaymentRequestDraft> {
        view.simplified_debts
            .iter()
            .filter(|debt| debt.to == view.viewer)
            .map(|debt| PaymentRequestDraft {
                group_id: view.group_id.clone(),
                requester: view.viewer.clone(),
                debtor: debt.from.clone(),
                debtor_name: debt.from_name.clone(),
                amount: debt.amount,
            })
            .collect()
    }
}

fn reject_duplicate_participants(policy: &SplitPolicy) -> Result<(), LedgerError> {
    let participants: Vec<&MemberId> = match policy {
        SplitPolicy::Equal(members) => members.iter().collect(),
        SplitPolicy::Exact(amounts) => amounts.iter().map(|(member, _)| member).collect(),
        SplitPolicy::Percentage(percentages) => {
            percentages.iter().map(|(member, _)| member).collect()
        }
    };

    let mut seen = FxHashSet::default();
    for member in participants {
        if !seen.insert(member) {
            return Err(LedgerError::DuplicateParticipant(member.clone()));
        }
    }
    Ok(())
}
