//! Client-side financial state for the finance tracker.
//!
//! The [`Coordinator`] owns every displayed figure and keeps it in sync with
//! a [`RemoteLedger`]; the [`TransactionBatchBuilder`] collects entries for a
//! single bulk write; [`currency::convert`] renders amounts.

pub mod batch;
pub mod coordinator;
pub mod currency;
pub mod error;
pub mod ledger;
pub mod period;

pub use batch::{TransactionBatchBuilder, TransactionDraft, parse_amount};
pub use coordinator::{
    Aggregates, Coordinator, FieldGroup, ListQuery, Notice, NoticeSource, RefreshOutcome,
    ReportFilter, SessionPhase, Snapshot, TransactionList,
};
pub use currency::{Currency, CurrencyState, ExchangeRate, convert};
pub use error::{Result, TrackerError};
pub use ledger::{HttpLedger, LedgerError, LedgerResult, RemoteLedger};
pub use period::{PeriodKey, PeriodSelector};
