use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use splitease_application::PlannedExpense;
use splitease_domain::MemberDirectory;
use std::{borrow::Cow, fmt::Write as _};

pub struct SplitPresenter;

impl SplitPresenter {
    /// Heading line followed by one row per participant.
    pub fn render(planned: &PlannedExpense, directory: &dyn MemberDirectory) -> String {
        let mut reply = String::with_capacity(256);
        let _ = writeln!(
            &mut reply,
            "{} ({} {})",
            labels::split_heading(planned.kind, planned.amount),
            directory.display_name(&planned.payer),
            labels::PAID
        );

        let table = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right, Alignment::Left])
            .headers(&[
                Cow::Borrowed(labels::MEMBER),
                Cow::Borrowed(labels::SHARE),
                Cow::Borrowed(labels::STATUS),
            ])
            .rows(planned.splits.iter().map(|line| {
                [
                    Cow::Borrowed(directory.display_name(&line.member)),
                    Cow::Owned(line.amount.to_string()),
                    Cow::Borrowed(if line.is_paid {
                        labels::PAID
                    } else {
                        labels::OWES
                    }),
                ]
            }))
            .build();
        reply.push_str(&table);
        reply
    }
}
