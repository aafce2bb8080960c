pub const MEMBER: &str = "Member";
pub const BALANCE: &str = "Balance";
pub const WALLET: &str = "Wallet";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";
pub const CATEGORY: &str = "Category";
pub const SHARE: &str = "Share";
pub const STATUS: &str = "Status";
pub const GROUP: &str = "Group";
pub const MEMBERS: &str = "Members";
pub const TOTAL_EXPENSES: &str = "Total expenses";
pub const YOUR_BALANCE: &str = "Your balance";
pub const TOKEN_UNITS: &str = "Token units";
pub const YOU_PAY: &str = "You pay";
pub const YOU_RECEIVE: &str = "You receive";
pub const BETWEEN_OTHERS: &str = "Between others";
pub const PAID: &str = "paid";
pub const OWES: &str = "owes";
pub const NO_WALLET: &str = "-";
pub const ALL_SETTLED: &str = "All settled up.";

pub fn owed_to_you(amount: impl std::fmt::Display) -> String {
    format!("You are owed ${amount}")
}

pub fn you_owe(amount: impl std::fmt::Display) -> String {
    format!("You owe ${amount}")
}

pub fn split_heading(kind: impl std::fmt::Display, amount: impl std::fmt::Display) -> String {
    format!("{kind} split of ${amount}")
}

pub fn requests_to_you(count: usize, total: impl std::fmt::Display) -> String {
    format!("Pending requests to you: {count} (${total})")
}

pub fn requests_you_sent(count: usize, total: impl std::fmt::Display) -> String {
    format!("Pending requests you sent: {count} (${total})")
}
