use std::time::Duration;

use walletlink_core::ChainType;

use crate::correlator::CorrelationError;
use crate::events::HostEvent;
use crate::transport::TransportError;

/// Errors surfaced by embedded-wallet operations.
///
/// Failure is only ever reported through this type; operations never
/// return an empty value to mean "did not work".
#[derive(Debug, thiserror::Error)]
pub enum EmbeddedWalletError {
    /// The host has not sent its ready signal yet.
    #[error("Wallet host is not ready")]
    NotReady,

    /// Creating the primary wallet failed (policy or host-reported).
    #[error("Failed to create wallet: {0}")]
    CreateFailed(String),

    /// Deriving an additional wallet failed (policy or host-reported).
    #[error("Failed to create additional wallet: {0}")]
    CreateAdditionalFailed(String),

    /// The RPC method is not on the signing allow-list for the chain.
    #[error("Unsupported {chain_type:?} RPC method: {method}")]
    UnsupportedMethod { method: String, chain_type: ChainType },

    #[error("No response to {event} within {timeout:?}")]
    Timeout { event: HostEvent, timeout: Duration },

    /// The host rejected the request.
    #[error("Wallet host error ({kind}): {message}")]
    Host { kind: String, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encoding, decoding or connection-loss failures.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<CorrelationError> for EmbeddedWalletError {
    fn from(err: CorrelationError) -> Self {
        match err {
            CorrelationError::Host(body) => EmbeddedWalletError::Host {
                kind: body.kind,
                message: body.message,
            },
            CorrelationError::Timeout { event, timeout } => {
                EmbeddedWalletError::Timeout { event, timeout }
            }
            CorrelationError::Transport(e) => EmbeddedWalletError::Transport(e),
            other => EmbeddedWalletError::Protocol(other.to_string()),
        }
    }
}

impl EmbeddedWalletError {
    /// Reclassify host and protocol failures of a create request as
    /// [`CreateFailed`](Self::CreateFailed). Timeouts and transport errors
    /// keep their own kind.
    pub(crate) fn into_create_failed(self) -> Self {
        match self {
            EmbeddedWalletError::Host { kind, message } => {
                EmbeddedWalletError::CreateFailed(format!("{kind}: {message}"))
            }
            EmbeddedWalletError::Protocol(message) => EmbeddedWalletError::CreateFailed(message),
            other => other,
        }
    }

    /// Same as [`into_create_failed`](Self::into_create_failed) for
    /// additional wallets.
    pub(crate) fn into_create_additional_failed(self) -> Self {
        match self {
            EmbeddedWalletError::Host { kind, message } => {
                EmbeddedWalletError::CreateAdditionalFailed(format!("{kind}: {message}"))
            }
            EmbeddedWalletError::Protocol(message) => {
                EmbeddedWalletError::CreateAdditionalFailed(message)
            }
            other => other,
        }
    }
}
