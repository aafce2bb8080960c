use crate::{
    model::{MemberBalances, MemberDirectory, MemberId, Money, SimplifiedDebt, Transfer},
    services::settlement_rounding::SETTLED_EPSILON,
};

/// Greedy min-cash-flow reduction of net balances into transfer edges.
///
/// Creditors and debtors are paired largest-first. This is not guaranteed to
/// reach the theoretical minimum edge count (that problem is NP-hard), but it
/// never emits more than `creditors + debtors - 1` edges.
pub struct DebtSimplifier;

impl DebtSimplifier {
    /// Reduces `balances` to a list of transfers that zero every position.
    ///
    /// Magnitudes of one cent or less are treated as settled. Equal magnitudes
    /// keep their order in `balances`.
    pub fn simplify(&self, balances: &MemberBalances) -> Vec<Transfer> {
        let mut creditors: Vec<(&MemberId, Money)> = Vec::new();
        let mut debtors: Vec<(&MemberId, Money)> = Vec::new();

        for (member, balance) in balances {
            let rounded = balance.round_to_cents();
            if rounded > SETTLED_EPSILON {
                creditors.push((member, rounded));
            } else if rounded < -SETTLED_EPSILON {
                debtors.push((member, rounded.abs()));
            }
        }

        creditors.sort_by(|(_, a), (_, b)| b.cmp(a));
        debtors.sort_by(|(_, a), (_, b)| b.cmp(a));

        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
        let (mut creditor_idx, mut debtor_idx) = (0, 0);

        while creditor_idx < creditors.len() && debtor_idx < debtors.len() {
            let (creditor, credit) = &mut creditors[creditor_idx];
            let (debtor, debt) = &mut debtors[debtor_idx];

            let amount = (*credit).min(*debt);
            let rounded = amount.round_to_cents();
            if rounded > SETTLED_EPSILON {
                transfers.push(Transfer {
                    from: (*debtor).clone(),
                    to: (*creditor).clone(),
                    amount: rounded,
                });
            }

            *credit -= amount;
            *debt -= amount;

            if *credit < SETTLED_EPSILON {
                creditor_idx += 1;
            }
            if *debt < SETTLED_EPSILON {
                debtor_idx += 1;
            }
        }

        tracing::debug!(
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            transfer_count = transfers.len(),
            "Debts simplified"
        );

        transfers
    }

    /// Same as [`simplify`](Self::simplify), joined with display metadata.
    ///
    /// Members missing from `directory` get the placeholder name and no wallet.
    pub fn simplify_with_directory(
        &self,
        balances: &MemberBalances,
        directory: &dyn MemberDirectory,
    ) -> Vec<SimplifiedDebt> {
        self.simplify(balances)
            .into_iter()
            .map(|transfer| SimplifiedDebt {
                from_name: directory.display_name(&transfer.from).to_owned(),
                from_wallet: directory.wallet_address(&transfer.from).map(str::to_owned),
                to_name: directory.display_name(&transfer.to).to_owned(),
                to_wallet: directory.wallet_address(&transfer.to).map(str::to_owned),
                from: transfer.from,
                to: transfer.to,
                amount: transfer.amount,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberInfo, UNKNOWN_MEMBER_NAME};
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    #[fixture]
    fn simplifier() -> DebtSimplifier {
        DebtSimplifier
    }

    fn balances(entries: &[(&str, i64)]) -> MemberBalances {
        entries
            .iter()
            .map(|(member, cents)| (MemberId::from(*member), Money::from_cents(*cents)))
            .collect()
    }

    fn transfers(expected: &[(&str, &str, i64)]) -> Vec<Transfer> {
        expected
            .iter()
            .map(|(from, to, cents)| Transfer {
                from: MemberId::from(*from),
                to: MemberId::from(*to),
                amount: Money::from_cents(*cents),
            })
            .collect()
    }

    #[rstest]
    #[case::one_creditor_two_debtors(
        &[("a", 2000), ("b", -1000), ("c", -1000)],
        &[("b", "a", 1000), ("c", "a", 1000)]
    )]
    #[case::single_pair(&[("a", 1000), ("b", -1000)], &[("b", "a", 1000)])]
    #[case::largest_pairs_first(
        &[("a", 500), ("b", 4000), ("c", -3000), ("d", -1500)],
        &[("c", "b", 3000), ("d", "b", 1000), ("d", "a", 500)]
    )]
    #[case::chain_collapses(
        &[("a", -2000), ("b", 0), ("c", 2000)],
        &[("a", "c", 2000)]
    )]
    #[case::ties_keep_balance_order(
        &[("a", 1000), ("b", 1000), ("c", -1000), ("d", -1000)],
        &[("c", "a", 1000), ("d", "b", 1000)]
    )]
    #[case::ties_keep_balance_order_not_id_order(
        &[("b", 1000), ("d", -1500), ("a", 1000), ("c", -500)],
        &[("d", "b", 1000), ("d", "a", 500), ("c", "a", 500)]
    )]
    #[case::one_cent_is_settled(&[("a", 1), ("b", -1)], &[])]
    #[case::all_zero(&[("a", 0), ("b", 0)], &[])]
    #[case::empty(&[], &[])]
    fn simplify_cases(
        simplifier: DebtSimplifier,
        #[case] input: &[(&str, i64)],
        #[case] expected: &[(&str, &str, i64)],
    ) {
        assert_eq!(simplifier.simplify(&balances(input)), transfers(expected));
    }

    #[rstest]
    fn unrounded_balances_are_rounded_before_pairing(simplifier: DebtSimplifier) {
        let input = MemberBalances::from_iter([
            (MemberId::from("a"), Money::new(66_667, 4)),
            (MemberId::from("b"), Money::new(-33_333, 4)),
            (MemberId::from("c"), Money::new(-33_334, 4)),
        ]);

        let result = simplifier.simplify(&input);

        assert_eq!(result, transfers(&[("b", "a", 333), ("c", "a", 333)]));
    }

    #[rstest]
    fn directory_metadata_is_joined(simplifier: DebtSimplifier) {
        let mut directory = HashMap::new();
        directory.insert(
            MemberId::from("a"),
            MemberInfo {
                name: Some("Alice".to_owned()),
                wallet_address: Some("0xa11ce".to_owned()),
            },
        );

        let result = simplifier
            .simplify_with_directory(&balances(&[("a", 1000), ("b", -1000)]), &directory);

        assert_eq!(
            result,
            vec![SimplifiedDebt {
                from: MemberId::from("b"),
                from_name: UNKNOWN_MEMBER_NAME.to_owned(),
                from_wallet: None,
                to: MemberId::from("a"),
                to_name: "Alice".to_owned(),
                to_wallet: Some("0xa11ce".to_owned()),
                amount: Money::from_cents(1000),
            }]
        );
    }
}
