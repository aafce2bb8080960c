use crate::{
    model::{MemberId, Money, SplitPolicy, SplitShare},
    services::settlement_rounding::SETTLED_EPSILON,
};
use rust_decimal::Decimal;
use thiserror::Error;

const PERCENTAGE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitAllocationError {
    #[error("split amounts (${actual}) don't equal total (${expected})")]
    SplitMismatch { expected: Money, actual: Money },
    #[error("percentages sum to {total}, not 100")]
    PercentageMismatch { total: Decimal },
    #[error("cannot split an expense among zero participants")]
    EmptyParticipantSet,
    #[error("share of member {member} would be negative")]
    NegativeShare { member: MemberId },
}

/// Partitions an expense total into per-member owed amounts.
pub struct SplitAllocator;

impl SplitAllocator {
    /// Allocates `total` according to `policy`.
    ///
    /// Shares are returned in the participant order given by the policy.
    pub fn allocate(
        &self,
        total: Money,
        policy: &SplitPolicy,
    ) -> Result<Vec<SplitShare>, SplitAllocationError> {
        match policy {
            SplitPolicy::Equal(participants) => allocate_equal(total, participants),
            SplitPolicy::Exact(amounts) => allocate_exact(total, amounts),
            SplitPolicy::Percentage(percentages) => allocate_percentage(total, percentages),
        }
    }
}

fn allocate_equal(
    total: Money,
    participants: &[MemberId],
) -> Result<Vec<SplitShare>, SplitAllocationError> {
    let Some((first, rest)) = participants.split_first() else {
        return Err(SplitAllocationError::EmptyParticipantSet);
    };

    let count = Decimal::from(participants.len());
    let per_person = Money::from_decimal(total.as_decimal() / count).round_to_cents();
    let remainder = (total - per_person * count).round_to_cents();
    let first_share = per_person + remainder;

    // The first participant absorbs the remainder, which can be negative.
    if per_person.is_negative() || first_share.is_negative() {
        return Err(SplitAllocationError::NegativeShare {
            member: first.clone(),
        });
    }

    tracing::debug!(
        participant_count = participants.len(),
        total = %total,
        per_person = %per_person,
        remainder = %remainder,
        "Equal split allocated"
    );

    let mut shares = Vec::with_capacity(participants.len());
    shares.push(SplitShare {
        member: first.clone(),
        amount: first_share,
    });
    shares.extend(rest.iter().map(|member| SplitShare {
        member: member.clone(),
        amount: per_person,
    }));
    Ok(shares)
}

fn allocate_exact(
    total: Money,
    amounts: &[(MemberId, Money)],
) -> Result<Vec<SplitShare>, SplitAllocationError> {
    if amounts.is_empty() {
        return Err(SplitAllocationError::EmptyParticipantSet);
    }

    let shares = amounts
        .iter()
        .map(|(member, amount)| {
            let amount = amount.round_to_cents();
            if amount.is_negative() {
                return Err(SplitAllocationError::NegativeShare {
                    member: member.clone(),
                });
            }
            Ok(SplitShare {
                member: member.clone(),
                amount,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let actual: Money = shares.iter().map(|share| share.amount).sum();
    if (actual - total).abs() > SETTLED_EPSILON {
        return Err(SplitAllocationError::SplitMismatch {
            expected: total,
            actual,
        });
    }

    Ok(shares)
}

fn allocate_percentage(
    total: Money,
    percentages: &[(MemberId, Decimal)],
) -> Result<Vec<SplitShare>, SplitAllocationError> {
    if percentages.is_empty() {
        return Err(SplitAllocationError::EmptyParticipantSet);
    }
    if let Some((member, _)) = percentages
        .iter()
        .find(|(_, percentage)| *percentage < Decimal::ZERO)
    {
        return Err(SplitAllocationError::NegativeShare {
            member: member.clone(),
        });
    }

    let percentage_total: Decimal = percentages.iter().map(|(_, percentage)| *percentage).sum();
    if (percentage_total - Decimal::ONE_HUNDRED).abs() > PERCENTAGE_TOLERANCE {
        return Err(SplitAllocationError::PercentageMismatch {
            total: percentage_total,
        });
    }

    let shares: Vec<SplitShare> = percentages
        .iter()
        .map(|(member, percentage)| SplitShare {
            member: member.clone(),
            amount: Money::from_decimal(*percentage / Decimal::ONE_HUNDRED * total.as_decimal())
                .round_to_cents(),
        })
        .collect();

    // Percentage shares keep their own rounding; drift is reported, not repaired.
    let allocated: Money = shares.iter().map(|share| share.amount).sum();
    if allocated != total {
        tracing::warn!(
            total = %total,
            allocated = %allocated,
            drift = %(allocated - total),
            participant_count = shares.len(),
            "Percentage split does not reconcile to the expense total"
        );
    }

    Ok(shares)
}
