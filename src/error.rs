use crate::config::ConfigError;
use thiserror::Error;

/// Failures while reading an address block
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("input stream is not readable: {0}")]
    InvalidStream(#[from] std::io::Error),

    #[error("memory allocation failed while building a record")]
    Allocation,
}

/// Failures while building or mutating the index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("memory allocation failed while growing the index")]
    Allocation,

    #[error("invalid index configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl From<std::collections::TryReserveError> for RecordError {
    fn from(_: std::collections::TryReserveError) -> Self {
        RecordError::Allocation
    }
}

impl From<std::collections::TryReserveError> for IndexError {
    fn from(_: std::collections::TryReserveError) -> Self {
        IndexError::Allocation
    }
}

/// Failures of a batch run over an input stream
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("failed to open {path}: {source}")]
    Open {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("input task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
