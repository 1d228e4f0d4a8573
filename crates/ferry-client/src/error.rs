//! Upload error taxonomy.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the protocol client and coordinator.
///
/// Any of these raised after a session exists triggers the compensating
/// abort before being re-raised to the caller.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error during {call}: {message}")]
    Transport { call: &'static str, message: String },

    #[error("create rejected by worker: {message}")]
    CreateRejected { message: String },

    #[error("part {part_number} rejected by worker: {message}")]
    PartRejected { part_number: u32, message: String },

    #[error("completion rejected by worker: {message}")]
    CompletionRejected { message: String },

    #[error("{call} response missing required field '{field}'")]
    MissingField {
        call: &'static str,
        field: &'static str,
    },

    #[error("worker acknowledged part {actual}, expected part {expected}")]
    PartNumberMismatch { expected: u32, actual: u32 },

    #[error("source file truncated: read {produced} of {expected} parts")]
    SourceTruncated { produced: u32, expected: u32 },

    #[error("completed size {actual} does not match file size {expected}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("illegal upload lifecycle transition: {0}")]
    Lifecycle(String),

    #[error(transparent)]
    Core(#[from] ferry_core::Error),

    #[error(transparent)]
    Token(#[from] ferry_signer::SignerError),
}

/// Abort failures are kept apart from [`UploadError`] so they can never be
/// confused with, or mask, the failure that triggered the abort. The
/// coordinator downgrades them to warnings.
#[derive(Debug, Error)]
pub enum AbortError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("worker refused abort: {0}")]
    Refused(String),

    #[error(transparent)]
    Token(#[from] ferry_signer::SignerError),
}
