//! JWT Token Handler
//! Mission: Issue and validate signed, time-limited bearer tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use tracing::debug;

/// Why a token was rejected.
///
/// Only used for logging and tests; callers over HTTP always see the same
/// generic failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed")]
    Malformed,
    #[error("bad_signature")]
    BadSignature,
    #[error("expired")]
    Expired,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a token for `subject` with the configured lifetime
    pub fn generate_token(&self, subject: &str) -> Result<String> {
        self.issue(subject, self.ttl)
    }

    /// Generate a token for `subject` expiring `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .context("Invalid timestamp")?
            .timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration,
        };

        debug!(subject, ttl_secs = ttl.num_seconds(), "Generating JWT");

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Validate a token and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        // The library accepts exp == now; a token is dead from its expiry second on.
        if decoded.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(decoded.claims)
    }
}
