use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use splitease_application::{GroupBalanceView, PaymentRequestDraft, TransferInstruction};
use splitease_domain::{Money, SimplifiedDebt};
use std::borrow::Cow;

pub struct BalancePresenter;

pub struct BalanceReport {
    pub balance_table: String,
    pub debt_table: Option<String>,
}

impl BalancePresenter {
    pub fn render(view: &GroupBalanceView) -> BalanceReport {
        let balance_table = Self::build_balance_table(view);
        if view.simplified_debts.is_empty() {
            return BalanceReport {
                balance_table,
                debt_table: None,
            };
        }

        let mut you_pay: Vec<&SimplifiedDebt> = Vec::new();
        let mut you_receive: Vec<&SimplifiedDebt> = Vec::new();
        let mut between_others: Vec<&SimplifiedDebt> = Vec::new();

        for debt in &view.simplified_debts {
            if debt.from == view.viewer {
                you_pay.push(debt);
            } else if debt.to == view.viewer {
                you_receive.push(debt);
            } else {
                between_others.push(debt);
            }
        }

        BalanceReport {
            balance_table,
            debt_table: Some(Self::build_debt_table(
                &you_pay,
                &you_receive,
                &between_others,
            )),
        }
    }

    pub fn build_balance_table(view: &GroupBalanceView) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(labels::MEMBER),
                Cow::Borrowed(labels::WALLET),
                Cow::Borrowed(labels::BALANCE),
            ]);

        for row in &view.balances {
            builder = builder.row([
                Cow::Borrowed(row.name.as_str()),
                Cow::Borrowed(row.wallet_address.as_deref().unwrap_or(labels::NO_WALLET)),
                signed(row.balance),
            ]);
        }

        builder.build()
    }

    pub fn build_debt_table(
        you_pay: &[&SimplifiedDebt],
        you_receive: &[&SimplifiedDebt],
        between_others: &[&SimplifiedDebt],
    ) -> String {
        let categorized = [
            (labels::YOU_PAY, you_pay),
            (labels::YOU_RECEIVE, you_receive),
            (labels::BETWEEN_OTHERS, between_others),
        ];

        TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(labels::CATEGORY),
                Cow::Borrowed(labels::FROM),
                Cow::Borrowed(labels::TO),
                Cow::Borrowed(labels::AMOUNT),
            ])
            .rows(categorized.into_iter().flat_map(|(category, debts)| {
                debts.iter().map(move |debt| {
                    [
                        Cow::Borrowed(category),
                        Cow::Borrowed(debt.from_name.as_str()),
                        Cow::Borrowed(debt.to_name.as_str()),
                        Cow::Owned(debt.amount.to_string()),
                    ]
                })
            }))
            .build()
    }

    pub fn build_instruction_table(instructions: &[TransferInstruction]) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(labels::TO),
                Cow::Borrowed(labels::WALLET),
                Cow::Borrowed(labels::AMOUNT),
                Cow::Borrowed(labels::TOKEN_UNITS),
            ]);

        for instruction in instructions {
            builder = builder.row([
                Cow::Borrowed(instruction.to_name.as_str()),
                Cow::Borrowed(instruction.to_wallet.as_str()),
                Cow::Owned(instruction.amount.to_string()),
                Cow::Owned(instruction.token_amount.to_string()),
            ]);
        }

        builder.build()
    }

    pub fn build_request_table(requests: &[PaymentRequestDraft]) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(labels::FROM), Cow::Borrowed(labels::AMOUNT)]);

        for request in requests {
            builder = builder.row([
                Cow::Borrowed(request.debtor_name.as_str()),
                Cow::Owned(request.amount.to_string()),
            ]);
        }

        builder.build()
    }
}

fn signed(amount: Money) -> Cow<'static, str> {
    let sign = if amount.is_negative() { "" } else { "+" };
    Cow::Owned(format!("{sign}{amount}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitease_application::{GroupId, MemberBalanceRow};
    use splitease_domain::{MemberId, TokenAmount};

    fn debt(from: &str, to: &str, cents: i64) -> SimplifiedDebt {
        SimplifiedDebt {
            from: MemberId::from(from),
            from_name: from.to_uppercase(),
            from_wallet: None,
            to: MemberId::from(to),
            to_name: to.to_uppercase(),
            to_wallet: Some(format!("0x{to}")),
            amount: Money::from_cents(cents),
        }
    }

    fn row(member: &str, wallet: Option<&str>, cents: i64) -> MemberBalanceRow {
        MemberBalanceRow {
            member: MemberId::from(member),
            name: member.to_uppercase(),
            wallet_address: wallet.map(str::to_owned),
            balance: Money::from_cents(cents),
        }
    }

    fn sample_view(simplified_debts: Vec<SimplifiedDebt>) -> GroupBalanceView {
        GroupBalanceView {
            group_id: GroupId::from("trip"),
            group_name: "Trip".to_owned(),
            viewer: MemberId::from("bob"),
            balances: vec![
                row("alice", Some("0xalice"), 1500),
                row("bob", None, -1000),
                row("carol", None, -500),
                row("dave", None, 0),
            ],
            simplified_debts,
        }
    }

    #[test]
    fn balance_table_signs_amounts_and_marks_missing_wallets() {
        let report = BalancePresenter::render(&sample_view(Vec::new()));

        let lines: Vec<&str> = report.balance_table.lines().collect();
        assert_eq!(lines[2], "ALICE   0xalice   +15.00");
        assert_eq!(lines[3], "BOB     -         -10.00");
        assert_eq!(lines[5], "DAVE    -          +0.00");
        assert!(report.debt_table.is_none());
    }

    #[test]
    fn debt_table_groups_rows_by_viewer_role() {
        let view = sample_view(vec![
            debt("carol", "alice", 500),
            debt("bob", "alice", 1000),
        ]);

        let table = BalancePresenter::render(&view).debt_table.expect("debt table");

        let lines: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(labels::YOU_PAY));
        assert!(lines[0].contains("BOB") && lines[0].ends_with("10.00"));
        assert!(lines[1].starts_with(labels::BETWEEN_OTHERS));
        assert!(lines[1].contains("CAROL"));
    }

    #[test]
    fn instruction_table_lists_token_units() {
        let instructions = vec![TransferInstruction {
            to: MemberId::from("alice"),
            to_name: "ALICE".to_owned(),
            to_wallet: "0xalice".to_owned(),
            amount: Money::from_cents(1000),
            token_amount: TokenAmount::from_money(Money::from_cents(1000), 6)
                .expect("valid amount"),
        }];

        let table = BalancePresenter::build_instruction_table(&instructions);

        assert!(table.contains("0xalice"));
        assert!(table.contains("10.00"));
        assert!(table.contains("10000000"));
    }
}
