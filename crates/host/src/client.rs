//! WebSocket client for a wallet host reachable over the network.
//!
//! [`HostClient`] holds the endpoint of one wallet host. Call
//! [`HostClient::connect`] to establish a live [`HostConnection`].

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// The raw WebSocket stream to a wallet host.
pub type HostStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Endpoint configuration for a wallet host.
#[derive(Debug, Clone)]
pub struct HostClient {
    ws_url: String,
}

/// A live WebSocket connection to a wallet host.
pub struct HostConnection {
    /// Unique id of this connection, sent during the handshake so the
    /// host can tell reconnects apart.
    pub connection_id: String,
    pub ws_stream: HostStream,
}

impl HostClient {
    /// * `ws_url` - WebSocket endpoint, e.g. `ws://127.0.0.1:8787/host`.
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Open the WebSocket, tagging it with a fresh connection id.
    pub async fn connect(&self) -> Result<HostConnection, HostClientError> {
        let connection_id = uuid::Uuid::new_v4().to_string();
        let separator = if self.ws_url.contains('?') { '&' } else { '?' };
        let url = format!("{}{separator}connectionId={connection_id}", self.ws_url);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            HostClientError::Connection(format!(
                "Failed to connect to wallet host at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(
            connection_id = %connection_id,
            "Connected to wallet host at {}",
            self.ws_url,
        );

        Ok(HostConnection {
            connection_id,
            ws_stream,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostClientError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}
