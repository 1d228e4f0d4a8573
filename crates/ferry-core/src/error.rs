//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid chunk size: {0} (must be non-zero)")]
    InvalidChunkSize(u64),

    #[error("part number {part} out of range (1..={total})")]
    PartOutOfRange { part: u32, total: u32 },

    #[error("manifest integrity error: {0}")]
    ManifestIntegrity(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid token action: {0}")]
    InvalidTokenAction(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
