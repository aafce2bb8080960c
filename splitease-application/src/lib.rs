#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod ledger_service;
pub mod model;
pub mod ports;

pub use error::{LedgerError, LedgerSourceError};
pub use ledger_service::LedgerService;
pub use model::{
    DashboardSummary, ExpenseDraft, GroupBalanceView, GroupId, GroupLedger, GroupMember,
    GroupSummary, MemberBalanceRow, PaymentRequestDraft, PaymentRequestRecord,
    PaymentRequestStatus, PlannedExpense, RequestSummary, TransferInstruction,
    UnknownPaymentRequestStatus,
};
pub use ports::{GroupLedgerSource, InMemoryLedgerSource};
