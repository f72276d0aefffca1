use thiserror::Error;

/// TBC chain operation errors.
#[derive(Debug, Error)]
pub enum TbcError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("outputs need merging: {0}")]
    NeedsMerge(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("signing error: {0}")]
    SigningError(String),
}
