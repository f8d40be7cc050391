//! Error types surfaced by the worker engine

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error("a worker for symbol {0} is already running")]
    AlreadyRunning(String),

    #[error("no worker is running for symbol {0}")]
    NotRunning(String),

    #[error("failed to fetch market data for {pair}: {reason}")]
    DataFetchFailed { pair: String, reason: String },
}

pub type Result<T> = std::result::Result<T, WorkerError>;
