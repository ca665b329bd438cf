//! The module contains the errors the ledger book can throw.
//!
//! - [`InvalidBatch`] thrown when a bulk write is empty or malformed.
//! - [`InvalidPeriod`] thrown when a period key is not `YYYY-MM`.
//! - [`InvalidRate`] thrown when the configured exchange rate is unusable.
//! - [`Advice`] thrown when advice cannot be composed.
//!
//!  [`InvalidBatch`]: EngineError::InvalidBatch
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidRate`]: EngineError::InvalidRate
//!  [`Advice`]: EngineError::Advice
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("No advice available: {0}")]
    Advice(String),
}
