//! Authentication session for the embedded-wallet client.
//!
//! [`AuthSession`] owns the access/refresh token pair: it restores a
//! persisted session, refreshes tokens before they expire, runs the
//! email and OAuth login flows against the auth backend ([`AuthApi`]),
//! and notifies one observer of every state transition.

pub mod api;
pub mod config;
pub mod error;
pub mod pkce;
pub mod session;
pub mod store;

pub use api::{AuthApi, AuthApiError, AuthBackend, OAuthInitResponse, OAuthProvider, SessionResponse};
pub use config::AuthConfig;
pub use error::AuthError;
pub use session::{AuthSession, AuthState, AuthStateCallback};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, StoredTokens, TokenStore};
