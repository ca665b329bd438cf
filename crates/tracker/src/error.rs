use thiserror::Error;

use crate::ledger::LedgerError;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Bad user input; reported inline, never touches the snapshot.
    #[error("validation error: {0}")]
    Validation(String),
    #[error("no transactions to record")]
    EmptyBatch,
    /// The ledger call failed; the previous snapshot is kept.
    #[error("ledger error: {0}")]
    Remote(#[from] LedgerError),
    #[error("exchange rate not loaded yet")]
    RateUnavailable,
}
