//! Backend token issuing for the ferry upload client.
//!
//! This crate provides:
//! - Construction of an issuer from the shared worker secret
//! - Minting of short-lived, action-scoped HS256 tokens
//! - Decoding for verification

pub mod error;
pub mod issuer;

pub use error::{SignerError, SignerResult};
pub use issuer::TokenIssuer;
