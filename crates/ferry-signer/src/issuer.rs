//! Minting of action-scoped backend tokens.

use crate::error::{SignerError, SignerResult};
use ferry_core::token::{BackendClaims, TokenAction};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::OffsetDateTime;

/// Issues short-lived backend tokens signed with the worker's shared secret.
///
/// Each token authorizes exactly one lifecycle action; the worker rejects it
/// for any other action and after expiry. Distinct from the per-session
/// client token, which the worker mints at create time.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    /// Create an issuer from the shared secret.
    ///
    /// Fails on an empty secret; a missing secret is a configuration problem
    /// caught here at construction, not per call.
    pub fn new(secret: &str) -> SignerResult<Self> {
        if secret.trim().is_empty() {
            return Err(SignerError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Mint a token scoped to `action`, valid for one fixed window from now.
    pub fn issue(&self, action: TokenAction) -> SignerResult<String> {
        let claims = BackendClaims::new(action, OffsetDateTime::now_utc().unix_timestamp());
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Decode and validate a backend token, returning its claims.
    pub fn decode(&self, token: &str) -> SignerResult<BackendClaims> {
        let data = decode::<BackendClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}
