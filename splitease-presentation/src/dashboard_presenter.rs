use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use splitease_application::DashboardSummary;
use std::{borrow::Cow, fmt::Write as _};

pub struct DashboardPresenter;

impl DashboardPresenter {
    pub fn render(summary: &DashboardSummary) -> String {
        let mut reply = String::with_capacity(512);
        if summary.total_owed.is_zero() && summary.total_owing.is_zero() {
            let _ = writeln!(&mut reply, "{}", labels::ALL_SETTLED);
        } else {
            let _ = writeln!(&mut reply, "{}", labels::owed_to_you(summary.total_owed));
            let _ = writeln!(&mut reply, "{}", labels::you_owe(summary.total_owing));
        }

        let requests = &summary.requests;
        if requests.incoming_count > 0 {
            let _ = writeln!(
                &mut reply,
                "{}",
                labels::requests_to_you(requests.incoming_count, requests.incoming_total)
            );
        }
        if requests.outgoing_count > 0 {
            let _ = writeln!(
                &mut reply,
                "{}",
                labels::requests_you_sent(requests.outgoing_count, requests.outgoing_total)
            );
        }

        if summary.groups.is_empty() {
            return reply;
        }

        reply.push('\n');
        let table = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(labels::GROUP),
                Cow::Borrowed(labels::MEMBERS),
                Cow::Borrowed(labels::TOTAL_EXPENSES),
                Cow::Borrowed(labels::YOUR_BALANCE),
            ])
            .rows(summary.groups.iter().map(|group| {
                [
                    Cow::Borrowed(group.group_name.as_str()),
                    Cow::Owned(group.member_count.to_string()),
                    Cow::Owned(group.total_expenses.to_string()),
                    Cow::Owned(group.balance.to_string()),
                ]
            }))
            .build();
        reply.push_str(&table);
        reply
    }
}
