//! Session tokens and their expiry rules.
//!
//! Access tokens issued by the auth backend are JWTs; the client only
//! needs their `exp` claim to decide when to refresh, so the signature is
//! not checked here (the backend re-validates every token it receives).
//! Refresh tokens are opaque and get a locally assigned lifetime.

use std::collections::HashSet;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Default margin before `expires_at` at which a token already counts as
/// expired, forcing a proactive refresh.
pub const DEFAULT_EXPIRATION_PADDING_SECS: i64 = 30;

/// A bearer credential with a known expiry instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub value: String,
    pub expires_at: Timestamp,
}

/// The only claim the client reads from an access token.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

impl Token {
    pub fn new(value: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// A token that expires `lifetime` after `issued_at`. Lifetimes that
    /// run past the last representable instant are capped there.
    pub fn with_lifetime(
        value: impl Into<String>,
        issued_at: Timestamp,
        lifetime: chrono::Duration,
    ) -> Self {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC);
        Self::new(value, expires_at)
    }

    /// Build a token from a JWT, taking `expires_at` from its `exp` claim.
    pub fn from_jwt(value: impl Into<String>) -> Result<Self, jsonwebtoken::errors::Error> {
        let value = value.into();

        let mut validation = Validation::new(Algorithm::ES256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let data = decode::<ExpiryClaims>(&value, &DecodingKey::from_secret(&[]), &validation)?;
        let expires_at = chrono::DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| jsonwebtoken::errors::Error::from(ErrorKind::InvalidToken))?;

        Ok(Self { value, expires_at })
    }

    /// `true` once `now` has entered the padding window before expiry.
    pub fn is_expired(&self, now: Timestamp, padding: chrono::Duration) -> bool {
        match self.expires_at.checked_sub_signed(padding) {
            Some(refresh_at) => now >= refresh_at,
            None => true,
        }
    }
}

/// The default padding as a [`chrono::Duration`].
pub fn default_expiration_padding() -> chrono::Duration {
    chrono::Duration::seconds(DEFAULT_EXPIRATION_PADDING_SECS)
}
