//! Client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for talking to the remote upload worker.
///
/// Loaded once at process start; absence or invalidity is fatal there, never
/// a per-upload error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the upload worker (e.g., "https://uploads.example.com").
    pub worker_url: String,
    /// Shared secret used to sign backend tokens.
    pub jwt_secret: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl ClientConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.worker_url.starts_with("http://") && !self.worker_url.starts_with("https://") {
            return Err(crate::Error::InvalidConfig(
                "worker_url must start with http:// or https://".to_string(),
            ));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(crate::Error::InvalidConfig(
                "jwt_secret must not be empty".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(crate::Error::InvalidConfig(
                "request_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Worker base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.worker_url.trim_end_matches('/')
    }

    /// Per-request timeout as a Duration.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Placeholder configuration written when no config file exists yet.
    pub fn sample() -> Self {
        Self {
            worker_url: "http://localhost:8787".to_string(),
            jwt_secret: "your-jwt-secret-here".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
