use thiserror::Error;

/// Errors reported by the key generation and evaluation entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinFheError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("lookup failure: {0}")]
    LookupFailure(String),
}

pub type Result<T> = std::result::Result<T, BinFheError>;

impl BinFheError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        BinFheError::InvalidArgument(msg.into())
    }

    pub(crate) fn missing_base(base: u64) -> Self {
        BinFheError::LookupFailure(format!("no key [{}] found in the map", base))
    }
}
