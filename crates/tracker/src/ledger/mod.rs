//! Boundary to the remote ledger service.

use api_types::{
    Category,
    transaction::{BatchAccepted, Transaction, TransactionBatch, TransactionType},
};
use async_trait::async_trait;
use thiserror::Error;

use crate::period::PeriodKey;

pub mod http;

pub use http::HttpLedger;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid ledger url: {0}")]
    InvalidUrl(String),
    #[error("not authenticated")]
    Unauthorized,
    /// The ledger refused the request content.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The ledger answered with something the client cannot use.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("{status}: {message}")]
    Server { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Operations offered by the ledger, scoped to the authenticated principal.
///
/// Amounts travel in rupiah. Implementations must be cheap to share across
/// tasks; the coordinator holds them as `Arc<dyn RemoteLedger>`.
#[async_trait]
pub trait RemoteLedger: Send + Sync {
    async fn add_transactions(&self, batch: TransactionBatch) -> LedgerResult<BatchAccepted>;

    async fn balance(&self, period: PeriodKey) -> LedgerResult<f64>;
    async fn income(&self, period: PeriodKey) -> LedgerResult<f64>;
    async fn expense(&self, period: PeriodKey) -> LedgerResult<f64>;

    async fn report_by_month(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>>;
    async fn income_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>>;
    async fn expense_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>>;

    async fn filtered_transactions(
        &self,
        kind: TransactionType,
        category: Option<Category>,
        period: PeriodKey,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Rupiah for one US dollar.
    async fn exchange_rate(&self) -> LedgerResult<f64>;

    /// Takes the three figures already formatted for display.
    async fn advice(&self, income: &str, expenses: &str, balance: &str) -> LedgerResult<String>;
}
