//! The opaque channel to the wallet host.
//!
//! The protocol layer only needs to push text frames out; inbound frames
//! are delivered by whoever owns the channel calling
//! [`WalletHost::on_message`](crate::session::WalletHost::on_message).

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Outbound half of a connection to the wallet host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one serialized JSON message to the host.
    async fn send(&self, message: String) -> Result<(), TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The receiving side of the channel is gone.
    #[error("Transport closed")]
    Closed,

    /// The message could not be written.
    #[error("Send failed: {0}")]
    Send(String),
}

/// A [`Transport`] that queues messages on an unbounded channel.
///
/// The receiver is drained by a connection task (see
/// [`connection`](crate::connection)) or, in tests, by an in-process fake
/// host. Messages queued while a connection is down are written once it
/// is re-established, except requests whose callers were already
/// abandoned on disconnect; the pump discards those.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, message: String) -> Result<(), TransportError> {
        self.sender
            .send(message)
            .map_err(|_| TransportError::Closed)
    }
}
