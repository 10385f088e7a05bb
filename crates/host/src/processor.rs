//! Message pump for one live wallet host connection.
//!
//! Writes queued outbound requests to the WebSocket and feeds every
//! inbound text frame into [`WalletHost::on_message`] until the socket
//! closes, errors, or the cancellation token fires.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::client::HostStream;
use crate::session::WalletHost;

/// Why a pump session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpExit {
    /// The socket closed or failed; the caller should reconnect.
    Disconnected,
    /// Every [`ChannelTransport`](crate::ChannelTransport) handle is gone.
    OutboundClosed,
    Cancelled,
}

/// Drive one connection until it ends.
///
/// A request dequeued but not written because the socket failed is lost;
/// its caller is released when the session is marked disconnected.
/// Requests still queued from an earlier connection whose callers were
/// released that way are discarded instead of written.
pub async fn pump_messages(
    ws_stream: HostStream,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    host: &WalletHost,
    cancel: &CancellationToken,
) -> PumpExit {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                return PumpExit::Cancelled;
            }
            queued = outbound.recv() => {
                let Some(text) = queued else {
                    let _ = sink.send(Message::Close(None)).await;
                    return PumpExit::OutboundClosed;
                };
                if !host.is_request_live(&text) {
                    tracing::debug!("Dropping queued request whose caller is gone");
                    continue;
                }
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::error!(error = %e, "Failed to write to wallet host");
                    return PumpExit::Disconnected;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    host.on_message(&text);
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::trace!("Ignoring binary frame from wallet host");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {
                    // Control frames are answered by tungstenite.
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Wallet host closed the WebSocket");
                    return PumpExit::Disconnected;
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Wallet host WebSocket receive error");
                    return PumpExit::Disconnected;
                }
                None => {
                    tracing::info!("Wallet host WebSocket stream exhausted");
                    return PumpExit::Disconnected;
                }
            }
        }
    }
}
