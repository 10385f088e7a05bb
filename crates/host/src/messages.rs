//! Wallet host message envelopes, payloads and parser.
//!
//! Requests are sent as `{"id", "event", "data"}`. The host answers with
//! the same envelope on success, or with `{"id", "event", "error":
//! {"type", "message"}}` on failure. The ready signal is out of band:
//! either the bare text `ready` or an id-less object whose `event` is
//! `"ready"`.

use serde::{Deserialize, Serialize};

use crate::events::HostEvent;
use crate::rpc::RpcRequest;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Outbound request envelope.
#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a, T> {
    pub id: &'a str,
    pub event: &'static str,
    pub data: &'a T,
}

/// Error body of a failed host response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// The host has finished initializing.
    Ready,
    /// Successful response to request `id`.
    Response {
        id: String,
        event: String,
        data: serde_json::Value,
    },
    /// Failed response to request `id`.
    Error {
        id: String,
        event: String,
        error: HostErrorBody,
    },
}

/// Loose wire shape used before classification.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<HostErrorBody>,
}

#[derive(Debug, thiserror::Error)]
pub enum MessageParseError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message has no `{0}` field")]
    MissingField(&'static str),
}

/// Parse a raw text message from the host.
///
/// Returns `Err` for malformed JSON or envelopes missing `id`/`event`.
/// Callers should log and continue.
pub fn parse_message(text: &str) -> Result<HostMessage, MessageParseError> {
    let trimmed = text.trim();
    if trimmed == HostEvent::Ready.as_str() {
        return Ok(HostMessage::Ready);
    }

    let raw: RawEnvelope = serde_json::from_str(trimmed)?;

    let Some(id) = raw.id else {
        return match raw.event.as_deref() {
            Some(name) if name == HostEvent::Ready.as_str() => Ok(HostMessage::Ready),
            _ => Err(MessageParseError::MissingField("id")),
        };
    };
    let event = raw.event.ok_or(MessageParseError::MissingField("event"))?;

    match raw.error {
        Some(error) => Ok(HostMessage::Error { id, event, error }),
        // Some events (set-recovery-password) answer without a payload.
        None => Ok(HostMessage::Response {
            id,
            event,
            data: raw.data.unwrap_or(serde_json::Value::Null),
        }),
    }
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// The `id` of an outbound request envelope, if `text` is one.
pub fn request_id(text: &str) -> Option<String> {
    serde_json::from_str::<IdOnly>(text).ok().map(|envelope| envelope.id)
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// `wallet:create`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest<'a> {
    pub access_token: &'a str,
}

/// `wallet:create-additional`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdditionalWalletRequest<'a> {
    pub access_token: &'a str,
    pub primary_wallet_address: &'a str,
    pub hd_wallet_index: u32,
}

/// `wallet:connect` and `wallet:recover`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddressRequest<'a> {
    pub access_token: &'a str,
    pub address: &'a str,
}

/// `wallet:set-recovery-password`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecoveryPasswordRequest<'a> {
    pub access_token: &'a str,
    pub address: &'a str,
    pub password: &'a str,
}

/// `wallet:rpc`. `address` is the HD root; `hd_wallet_index` selects the
/// signing wallet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRpcRequest<'a> {
    pub access_token: &'a str,
    pub address: &'a str,
    pub hd_wallet_index: u32,
    pub request: &'a RpcRequest,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response data of the create, create-additional, connect and recover
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalletAddressResponse {
    pub address: String,
}

pub type CreateWalletResponse = WalletAddressResponse;
pub type ConnectResponse = WalletAddressResponse;
pub type RecoverResponse = WalletAddressResponse;
