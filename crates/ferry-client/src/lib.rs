//! Upload worker protocol client and lifecycle coordination.
//!
//! This crate implements the client side of the multipart upload protocol:
//! - The [`UploadWorker`] trait, the seam between lifecycle logic and HTTP
//! - [`HttpWorkerClient`], the reqwest-backed worker implementation
//! - The chunk reader: lazy, forward-only file partitioning
//! - [`UploadCoordinator`], the create → parts → complete state machine with
//!   compensating abort

pub mod coordinator;
pub mod error;
pub mod http;
pub mod reader;
pub mod worker;

pub use coordinator::{UploadCoordinator, UploadEvent, UploadPhase, UploadReport};
pub use error::{AbortError, UploadError};
pub use http::HttpWorkerClient;
pub use reader::{ChunkStream, FileInfo};
pub use worker::UploadWorker;
