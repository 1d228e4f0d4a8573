//! Backend token actions and claims.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validity window of a backend token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// Claim value marking a token as backend-issued (as opposed to the
/// per-session client token minted by the worker).
pub const TOKEN_TYPE_BACKEND: &str = "backend";

/// Lifecycle action a backend token is scoped to.
///
/// A token minted for one action is rejected by the worker when presented
/// for another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAction {
    /// Create an upload session.
    Create,
    /// Complete an upload session.
    Complete,
    /// Abort an upload session.
    Abort,
}

impl TokenAction {
    /// Parse from string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "create" => Ok(Self::Create),
            "complete" => Ok(Self::Complete),
            "abort" => Ok(Self::Abort),
            _ => Err(crate::Error::InvalidTokenAction(s.to_string())),
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Complete => "complete",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for TokenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Claims carried by a backend authorization token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackendClaims {
    /// Always [`TOKEN_TYPE_BACKEND`].
    #[serde(rename = "type")]
    pub token_type: String,
    /// The single action this token authorizes.
    pub action: TokenAction,
    /// Issue time, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds: exactly `iat + TOKEN_TTL_SECS`.
    pub exp: i64,
}

impl BackendClaims {
    /// Build claims for `action` issued at `issued_at` (unix seconds).
    pub fn new(action: TokenAction, issued_at: i64) -> Self {
        Self {
            token_type: TOKEN_TYPE_BACKEND.to_string(),
            action,
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
        }
    }
}
