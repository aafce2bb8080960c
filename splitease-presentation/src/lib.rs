#![warn(clippy::uninlined_format_args)]

pub mod balance_presenter;
pub mod dashboard_presenter;
pub mod labels;
pub mod split_presenter;
pub mod text_table;

pub use balance_presenter::{BalancePresenter, BalanceReport};
pub use dashboard_presenter::DashboardPresenter;
pub use split_presenter::SplitPresenter;
pub use text_table::combine_sections_vertically;
