//! Core domain types and shared logic for the ferry upload client.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Chunk geometry (part counts and lengths for a file)
//! - Upload session lifecycle records
//! - Part acknowledgments and the completion manifest
//! - Backend token actions and claims
//! - Client configuration

pub mod chunk;
pub mod config;
pub mod error;
pub mod session;
pub mod token;

pub use chunk::{Chunk, ChunkPlan};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use session::{CompletionManifest, PartRef, PartResult, UploadSession};
pub use token::{BackendClaims, TokenAction};

/// Chunk size agreed with the remote worker: 5 MiB.
///
/// Changing this on one side without the other breaks part accounting.
pub const CHUNK_SIZE: u64 = 5 * 1024 * 1024;
