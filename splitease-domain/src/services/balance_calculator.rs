use crate::model::{Expense, MemberBalances, MemberId, Money, SettlementRecord};

/// Accumulates signed member positions from expenses and settlements.
///
/// Amounts are summed unrounded; round at the consumer boundary with
/// [`round_balances`](crate::services::settlement_rounding::round_balances).
#[derive(Debug, Default, Clone)]
pub struct BalanceAccumulator {
    balances: MemberBalances,
}

impl BalanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a zero balance for each member not seen yet. Members already
    /// present keep their position.
    pub fn include_members<'a, I>(&mut self, members: I)
    where
        I: IntoIterator<Item = &'a MemberId>,
    {
        for member in members {
            self.entry(member);
        }
    }

    /// Credits the payer with the full amount and debits every split line,
    /// including the payer's own line if present.
    pub fn apply_expense(&mut self, expense: &Expense) {
        *self.entry(&expense.payer) += expense.amount;
        for split in &expense.splits {
            *self.entry(&split.member) -= split.amount;
        }
    }

    /// Moves a confirmed settlement's amount from the receiver back to the
    /// sender. Returns whether the settlement was counted.
    pub fn apply_settlement(&mut self, settlement: &SettlementRecord) -> bool {
        if !settlement.status.counts_toward_balance() {
            return false;
        }
        *self.entry(&settlement.from) += settlement.amount;
        *self.entry(&settlement.to) -= settlement.amount;
        true
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }

    fn entry(&mut self, member: &MemberId) -> &mut Money {
        self.balances.entry(member.clone()).or_insert(Money::ZERO)
    }
}

/// Computes net balances from a group's full history.
pub struct BalanceCalculator;

impl BalanceCalculator {
    pub fn net_balances(
        &self,
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) -> MemberBalances {
        Self::accumulate(expenses, settlements).into_balances()
    }

    /// Like [`net_balances`](Self::net_balances) but lists every given member,
    /// with zero for those without activity. Inactive members come after
    /// everyone seen in the history.
    pub fn net_balances_for_members<'a, I>(
        &self,
        members: I,
        expenses: &[Expense],
        settlements: &[SettlementRecord],
    ) -> MemberBalances
    where
        I: IntoIterator<Item = &'a MemberId>,
    {
        let mut accumulator = Self::accumulate(expenses, settlements);
        accumulator.include_members(members);
        accumulator.into_balances()
    }

    fn accumulate(expenses: &[Expense], settlements: &[SettlementRecord]) -> BalanceAccumulator {
        let mut accumulator = BalanceAccumulator::new();
        for expense in expenses {
            accumulator.apply_expense(expense);
        }
        let mut confirmed = 0usize;
        for settlement in settlements {
            if accumulator.apply_settlement(settlement) {
                confirmed += 1;
            }
        }

        tracing::debug!(
            expense_count = expenses.len(),
            settlement_count = settlements.len(),
            confirmed_settlement_count = confirmed,
            member_count = accumulator.balances().len(),
            "Net balances computed"
        );

        accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SettlementStatus, SplitLine};
    use rstest::{fixture, rstest};

    #[fixture]
    fn calculator() -> BalanceCalculator {
        BalanceCalculator
    }

    fn id(value: &str) -> MemberId {
        MemberId::from(value)
    }

    fn expense(payer: &str, cents: i64, splits: &[(&str, i64)]) -> Expense {
        Expense {
            payer: id(payer),
            amount: Money::from_cents(cents),
            splits: splits
                .iter()
                .map(|(member, cents)| SplitLine::new(*member, Money::from_cents(*cents)))
                .collect(),
        }
    }

    fn settlement(from: &str, to: &str, cents: i64, status: SettlementStatus) -> SettlementRecord {
        SettlementRecord {
            from: id(from),
            to: id(to),
            amount: Money::from_cents(cents),
            status,
            tx_hash: None,
        }
    }

    fn balances(expected: &[(&str, i64)]) -> MemberBalances {
        expected
            .iter()
            .map(|(member, cents)| (id(member), Money::from_cents(*cents)))
            .collect()
    }

    #[rstest]
    #[case::meal_split_three_ways(
        vec![expense("a", 3000, &[("a", 1000), ("b", 1000), ("c", 1000)])],
        vec![],
        &[("a", 2000), ("b", -1000), ("c", -1000)]
    )]
    #[case::payer_absorbs_remainder(
        vec![expense("a", 1000, &[("a", 334), ("b", 333), ("c", 333)])],
        vec![],
        &[("a", 666), ("b", -333), ("c", -333)]
    )]
    #[case::payer_excluded_from_splits(
        vec![expense("a", 2000, &[("b", 1000), ("c", 1000)])],
        vec![],
        &[("a", 2000), ("b", -1000), ("c", -1000)]
    )]
    #[case::confirmed_settlement_moves_obligation(
        vec![expense("a", 2000, &[("b", 2000)])],
        vec![settlement("b", "a", 1000, SettlementStatus::Confirmed)],
        &[("a", 1000), ("b", -1000)]
    )]
    #[case::pending_and_failed_are_ignored(
        vec![expense("a", 2000, &[("b", 2000)])],
        vec![
            settlement("b", "a", 1000, SettlementStatus::Pending),
            settlement("b", "a", 500, SettlementStatus::Failed),
        ],
        &[("a", 2000), ("b", -2000)]
    )]
    #[case::settlement_only_member_appears(
        vec![],
        vec![settlement("b", "a", 1000, SettlementStatus::Confirmed)],
        &[("a", -1000), ("b", 1000)]
    )]
    #[case::empty_history(vec![], vec![], &[])]
    fn net_balance_cases(
        calculator: BalanceCalculator,
        #[case] expenses: Vec<Expense>,
        #[case] settlements: Vec<SettlementRecord>,
        #[case] expected: &[(&str, i64)],
    ) {
        let result = calculator.net_balances(&expenses, &settlements);

        assert_eq!(result, balances(expected));
        let total: Money = result.values().sum();
        assert!(total.is_zero());
    }

    #[rstest]
    fn members_without_activity_are_listed(calculator: BalanceCalculator) {
        let members = [id("a"), id("b"), id("d")];
        let expenses = vec![expense("a", 1000, &[("b", 1000)])];

        let result = calculator.net_balances_for_members(&members, &expenses, &[]);

        assert_eq!(result, balances(&[("a", 1000), ("b", -1000), ("d", 0)]));
    }

    #[rstest]
    fn balances_follow_first_appearance(calculator: BalanceCalculator) {
        let members = [id("a"), id("b"), id("c"), id("d"), id("f")];
        let expenses = vec![
            expense("b", 1000, &[("d", 1000)]),
            expense("a", 1000, &[("d", 500), ("c", 500)]),
        ];
        let settlements = vec![settlement("e", "b", 100, SettlementStatus::Confirmed)];

        let result = calculator.net_balances_for_members(&members, &expenses, &settlements);

        let order: Vec<&str> = result.keys().map(MemberId::as_str).collect();
        assert_eq!(order, vec!["b", "d", "a", "c", "e", "f"]);
    }

    #[rstest]
    fn accumulation_is_not_rounded_midway(calculator: BalanceCalculator) {
        let third = Money::new(3_333, 4);
        let expenses: Vec<Expense> = (0..3)
            .map(|_| Expense {
                payer: id("a"),
                amount: third,
                splits: vec![SplitLine::new("b", third)],
            })
            .collect();

        let result = calculator.net_balances(&expenses, &[]);

        assert_eq!(result[&id("a")], Money::new(9_999, 4));
        assert_eq!(result[&id("b")], Money::new(-9_999, 4));
    }

    #[test]
    fn accumulator_reports_counted_settlements() {
        let mut accumulator = BalanceAccumulator::new();
        assert!(accumulator.apply_settlement(&settlement(
            "a",
            "b",
            100,
            SettlementStatus::Confirmed
        )));
        assert!(!accumulator.apply_settlement(&settlement(
            "a",
            "b",
            100,
            SettlementStatus::Pending
        )));
        assert_eq!(accumulator.balances(), &balances(&[("a", 100), ("b", -100)]));
    }
}
