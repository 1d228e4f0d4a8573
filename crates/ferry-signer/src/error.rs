//! Signer error types.

use thiserror::Error;

/// Token issuing errors.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("token encoding error: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Result type for token operations.
pub type SignerResult<T> = std::result::Result<T, SignerError>;
