use fxhash::FxHashSet;
use rust_decimal::Decimal;
use serde::Deserialize;
use splitease_application::{
    ExpenseDraft, GroupId, GroupLedger, GroupMember, LedgerError, LedgerService,
    PaymentRequestRecord, PaymentRequestStatus, PlannedExpense, UnknownPaymentRequestStatus,
};
use splitease_domain::{
    Expense, MemberId, MemberInfo, Money, SettlementRecord, SettlementStatus, SplitLine,
    SplitPolicy, UnknownSettlementStatus,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerFileError {
    #[error("malformed ledger JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("group id `{0}` appears more than once")]
    DuplicateGroup(String),
    #[error("group {group}: member {member} is listed more than once")]
    DuplicateMember { group: String, member: String },
    #[error("group {group}, expense #{index}: give either `split` or `splits`, not both")]
    AmbiguousExpense { group: String, index: usize },
    #[error("group {group}, expense #{index}: missing `split` or `splits`")]
    MissingSplit { group: String, index: usize },
    #[error("group {group}, expense #{index}: {source}")]
    Expense {
        group: String,
        index: usize,
        #[source]
        source: LedgerError,
    },
    #[error("group {group}, settlement #{index}: {source}")]
    Settlement {
        group: String,
        index: usize,
        #[source]
        source: UnknownSettlementStatus,
    },
    #[error("group {group}, payment request #{index}: {source}")]
    RequestStatus {
        group: String,
        index: usize,
        #[source]
        source: UnknownPaymentRequestStatus,
    },
    #[error("group {group}, payment request #{index}: {source}")]
    PaymentRequest {
        group: String,
        index: usize,
        #[source]
        source: LedgerError,
    },
}

#[derive(Debug, Deserialize)]
struct LedgerFileDto {
    groups: Vec<GroupDto>,
}

#[derive(Debug, Deserialize)]
struct GroupDto {
    id: String,
    name: String,
    members: Vec<MemberDto>,
    #[serde(default)]
    expenses: Vec<ExpenseDto>,
    #[serde(default)]
    settlements: Vec<SettlementDto>,
    #[serde(default)]
    payment_requests: Vec<PaymentRequestDto>,
}

#[derive(Debug, Deserialize)]
struct MemberDto {
    id: String,
    name: Option<String>,
    wallet_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpenseDto {
    payer: String,
    amount: Decimal,
    split: Option<SplitDto>,
    splits: Option<Vec<SplitLineDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
enum SplitDto {
    Equal {
        #[serde(default)]
        members: Vec<String>,
    },
    Exact {
        shares: Vec<ExactShareDto>,
    },
    Percentage {
        shares: Vec<PercentageShareDto>,
    },
}

#[derive(Debug, Deserialize)]
struct ExactShareDto {
    member: String,
    amount: Decimal,
}

#[derive(Debug, Deserialize)]
struct PercentageShareDto {
    member: String,
    percentage: Decimal,
}

#[derive(Debug, Deserialize)]
struct SplitLineDto {
    member: String,
    amount: Decimal,
    #[serde(default)]
    is_paid: bool,
}

#[derive(Debug, Deserialize)]
struct SettlementDto {
    from: String,
    to: String,
    amount: Decimal,
    status: String,
    tx_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentRequestDto {
    from: String,
    to: String,
    amount: Decimal,
    status: String,
}

/// A group read from the ledger file, with the expenses that were allocated
/// from a split policy while loading.
pub struct LoadedGroup {
    pub ledger: GroupLedger,
    pub planned: Vec<PlannedExpense>,
}

pub fn parse(content: &str) -> Result<Vec<LoadedGroup>, LedgerFileError> {
    let file: LedgerFileDto = serde_json::from_str(content)?;

    if let Some(duplicate) = first_duplicate(file.groups.iter().map(|group| group.id.as_str())) {
        return Err(LedgerFileError::DuplicateGroup(duplicate));
    }

    file.groups.into_iter().map(load_group).collect()
}

fn load_group(group: GroupDto) -> Result<LoadedGroup, LedgerFileError> {
    let GroupDto {
        id,
        name,
        members,
        expenses,
        settlements,
        payment_requests,
    } = group;

    if let Some(duplicate) = first_duplicate(members.iter().map(|member| member.id.as_str())) {
        return Err(LedgerFileError::DuplicateMember {
            group: id,
            member: duplicate,
        });
    }

    let settlements = settlements
        .into_iter()
        .enumerate()
        .map(|(index, settlement)| {
            let status: SettlementStatus =
                settlement
                    .status
                    .parse()
                    .map_err(|source| LedgerFileError::Settlement {
                        group: id.clone(),
                        index,
                        source,
                    })?;
            Ok(SettlementRecord {
                from: MemberId::new(settlement.from),
                to: MemberId::new(settlement.to),
                amount: Money::from_decimal(settlement.amount),
                status,
                tx_hash: settlement.tx_hash,
            })
        })
        .collect::<Result<Vec<_>, LedgerFileError>>()?;

    let roster = members.into_iter().map(|member| GroupMember {
        id: MemberId::new(member.id),
        info: MemberInfo {
            name: member.name,
            wallet_address: member.wallet_address,
        },
    });
    let mut ledger =
        GroupLedger::new(GroupId::new(id.as_str()), name, roster).with_settlements(settlements);

    let mut requests = Vec::with_capacity(payment_requests.len());
    for (index, request) in payment_requests.into_iter().enumerate() {
        let status: PaymentRequestStatus =
            request
                .status
                .parse()
                .map_err(|source| LedgerFileError::RequestStatus {
                    group: id.clone(),
                    index,
                    source,
                })?;
        let record = PaymentRequestRecord {
            from: MemberId::new(request.from),
            to: MemberId::new(request.to),
            amount: Money::from_decimal(request.amount),
            status,
        };
        let record = LedgerService::record_payment_request_in(&ledger, record).map_err(|source| {
            LedgerFileError::PaymentRequest {
                group: id.clone(),
                index,
                source,
            }
        })?;
        requests.push(record);
    }
    ledger = ledger.with_payment_requests(requests);

    let mut recorded = Vec::with_capacity(expenses.len());
    let mut planned = Vec::new();
    for (index, expense) in expenses.into_iter().enumerate() {
        let payer = MemberId::new(expense.payer);
        let amount = Money::from_decimal(expense.amount);

        match (expense.split, expense.splits) {
            (Some(_), Some(_)) => {
                return Err(LedgerFileError::AmbiguousExpense { group: id, index });
            }
            (None, None) => return Err(LedgerFileError::MissingSplit { group: id, index }),
            (Some(split), None) => {
                let draft = ExpenseDraft {
                    payer,
                    amount,
                    split: split.into_policy(),
                };
                let plan = LedgerService::plan_expense_in(&ledger, &draft).map_err(|source| {
                    LedgerFileError::Expense {
                        group: id.clone(),
                        index,
                        source,
                    }
                })?;
                recorded.push(plan.clone().into_expense());
                planned.push(plan);
            }
            (None, Some(lines)) => {
                let expense = Expense {
                    payer,
                    amount,
                    splits: lines
                        .into_iter()
                        .map(|line| SplitLine {
                            member: MemberId::new(line.member),
                            amount: Money::from_decimal(line.amount),
                            is_paid: line.is_paid,
                        })
                        .collect(),
                };
                let expense = LedgerService::record_expense_in(&ledger, expense).map_err(|source| {
                    LedgerFileError::Expense {
                        group: id.clone(),
                        index,
                        source,
                    }
                })?;
                recorded.push(expense);
            }
        }
    }

    ledger = ledger.with_expenses(recorded);
    tracing::debug!(
        group_id = %ledger.id,
        expense_count = ledger.expenses.len(),
        planned_count = planned.len(),
        settlement_count = ledger.settlements.len(),
        payment_request_count = ledger.payment_requests.len(),
        "Group loaded from ledger file"
    );

    Ok(LoadedGroup { ledger, planned })
}

fn first_duplicate<'a>(ids: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut seen = FxHashSet::default();
    ids.into_iter().find(|id| !seen.insert(*id)).map(str::to_owned)
}

impl SplitDto {
    fn into_policy(self) -> SplitPolicy {
        match self {
            SplitDto::Equal { members } => {
                SplitPolicy::Equal(members.into_iter().map(MemberId::new).collect())
            }
            SplitDto::Exact { shares } => SplitPolicy::Exact(
                shares
                    .into_iter()
                    .map(|share| (MemberId::new(share.member), Money::from_decimal(share.amount)))
                    .collect(),
            ),
            SplitDto::Percentage { shares } => SplitPolicy::Percentage(
                shares
                    .into_iter()
                    .map(|share| (MemberId::new(share.member), share.percentage))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use splitease_domain::SplitKind;

    const SAMPLE: &str = r#"{
        "groups": [{
            "id": "trip",
            "name": "Trip",
            "members": [
                { "id": "alice", "name": "Alice", "wallet_address": "0xa11ce" },
                { "id": "bob" }
            ],
            "expenses": [
                { "payer": "alice", "amount": "10.00", "split": { "type": "EQUAL" } },
                {
                    "payer": "bob",
                    "amount": "4",
                    "splits": [{ "member": "alice", "amount": "4" }]
                }
            ],
            "settlements": [
                { "from": "bob", "to": "alice", "amount": "1.50", "status": "CONFIRMED" }
            ]
        }]
    }"#;

    #[rstest]
    fn parse_plans_policy_expenses_and_keeps_presplit_lines() {
        let groups = parse(SAMPLE).expect("valid ledger");
        let group = &groups[0];

        assert_eq!(group.ledger.member_count(), 2);
        assert_eq!(group.planned.len(), 1);
        assert_eq!(group.planned[0].kind, SplitKind::Equal);
        assert_eq!(
            group.planned[0].splits,
            vec![
                SplitLine {
                    member: MemberId::from("alice"),
                    amount: Money::from_cents(500),
                    is_paid: true,
                },
                SplitLine::new("bob", Money::from_cents(500)),
            ]
        );
        assert_eq!(group.ledger.expenses.len(), 2);
        assert_eq!(
            group.ledger.expenses[1].splits,
            vec![SplitLine::new("alice", Money::from_cents(400))]
        );
        assert_eq!(
            group.ledger.settlements[0].status,
            SettlementStatus::Confirmed
        );
    }

    #[rstest]
    #[case::unknown_status(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"}],
            "settlements":[{"from":"a","to":"a","amount":"1","status":"DONE"}]}]}"#,
        "group g, settlement #0: unknown settlement status `DONE`"
    )]
    #[case::missing_split(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"}],
            "expenses":[{"payer":"a","amount":"1"}]}]}"#,
        "group g, expense #0: missing `split` or `splits`"
    )]
    #[case::payer_outside_group(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"}],
            "expenses":[{"payer":"z","amount":"1","split":{"type":"EQUAL"}}]}]}"#,
        "group g, expense #0: payer z is not in the group"
    )]
    #[case::presplit_line_outside_group(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"}],
            "expenses":[{"payer":"a","amount":"10",
                "splits":[{"member":"b","amount":"3"},{"member":"zed","amount":"-1"}]}]}]}"#,
        "group g, expense #0: user zed is not in the group"
    )]
    #[case::presplit_negative_line(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"}],
            "expenses":[{"payer":"a","amount":"10",
                "splits":[{"member":"a","amount":"11"},{"member":"b","amount":"-1"}]}]}]}"#,
        "group g, expense #0: share of member b would be negative"
    )]
    #[case::presplit_lines_do_not_add_up(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"}],
            "expenses":[{"payer":"a","amount":"10",
                "splits":[{"member":"a","amount":"3"},{"member":"b","amount":"5"}]}]}]}"#,
        "group g, expense #0: split amounts ($8.00) don't equal total ($10.00)"
    )]
    #[case::duplicate_group(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"}]},
            {"id":"g","name":"Again","members":[{"id":"b"}]}]}"#,
        "group id `g` appears more than once"
    )]
    #[case::duplicate_member(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"},{"id":"a"}]}]}"#,
        "group g: member a is listed more than once"
    )]
    #[case::unknown_request_status(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"}],
            "payment_requests":[{"from":"a","to":"b","amount":"1","status":"OPEN"}]}]}"#,
        "group g, payment request #0: unknown payment request status `OPEN`"
    )]
    #[case::request_to_outsider(
        r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"}],
            "payment_requests":[{"from":"a","to":"z","amount":"1","status":"PENDING"}]}]}"#,
        "group g, payment request #0: user z is not in the group"
    )]
    fn parse_reports_location_of_bad_entries(#[case] content: &str, #[case] expected: &str) {
        let err = parse(content).err().expect("invalid ledger");
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    fn demo_ledger_loads() {
        let groups = parse(include_str!("../../demos/ledger.json")).expect("demo ledger");

        let planned: Vec<usize> = groups.iter().map(|group| group.planned.len()).collect();
        assert_eq!(planned, vec![3, 0]);
        assert_eq!(groups[1].ledger.total_expenses(), Money::from_cents(1000));
        assert_eq!(groups[1].ledger.payment_requests.len(), 2);
    }

    #[rstest]
    fn parse_reads_payment_requests() {
        let groups = parse(
            r#"{"groups":[{"id":"g","name":"G","members":[{"id":"a"},{"id":"b"}],
                "payment_requests":[
                    {"from":"a","to":"b","amount":"2.50","status":"PENDING"},
                    {"from":"b","to":"a","amount":"1","status":"CANCELLED"}
                ]}]}"#,
        )
        .expect("valid ledger");

        assert_eq!(
            groups[0].ledger.payment_requests,
            vec![
                PaymentRequestRecord {
                    from: MemberId::from("a"),
                    to: MemberId::from("b"),
                    amount: Money::from_cents(250),
                    status: PaymentRequestStatus::Pending,
                },
                PaymentRequestRecord {
                    from: MemberId::from("b"),
                    to: MemberId::from("a"),
                    amount: Money::from_cents(100),
                    status: PaymentRequestStatus::Cancelled,
                },
            ]
        );
    }

    #[rstest]
    fn parse_rejects_malformed_json() {
        assert!(matches!(parse("{"), Err(LedgerFileError::Json(_))));
    }
}
