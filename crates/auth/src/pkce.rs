//! PKCE and state parameters for the OAuth login flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Verifier, challenge and state for one OAuth attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    /// `BASE64URL(SHA256(code_verifier))`.
    pub code_challenge: String,
    pub state_code: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = code_challenge_for(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
            state_code: generate_state(),
        }
    }
}

/// 48 random bytes, base64url-encoded (64 characters).
#[must_use]
pub fn generate_code_verifier() -> String {
    let random_bytes: [u8; 48] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// S256 challenge for `verifier`.
#[must_use]
pub fn code_challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// 16 random bytes, base64url-encoded (22 characters).
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}
