use crate::api::AuthApiError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// `initialize` has not completed yet.
    #[error("Auth session is not ready")]
    NotReady,

    /// No session exists; the user must log in.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A token refresh or login exchange failed. The session is now
    /// unauthenticated.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend issued an access token the client cannot read.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error(transparent)]
    Api(#[from] AuthApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// `login_with_oauth_code` was called without a prior
    /// `oauth_authorization_url`.
    #[error("No OAuth flow in progress")]
    OAuthNotStarted,

    #[error("OAuth state does not match the flow in progress")]
    OAuthStateMismatch,
}
