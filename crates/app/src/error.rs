use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Tracker(#[from] tracker::TrackerError),
    #[error("ledger error: {0}")]
    Ledger(#[from] tracker::LedgerError),
    #[error("ledger setup error: {0}")]
    Engine(#[from] engine::EngineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid entry '{entry}': {reason}")]
    Entry { entry: String, reason: String },
}
