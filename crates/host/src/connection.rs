//! Long-lived WebSocket connection task for a [`WalletHost`].
//!
//! [`spawn_connection`] wires a [`ChannelTransport`]'s receiving half to
//! a WebSocket: connect -> pump messages -> mark disconnected ->
//! reconnect with backoff, until cancelled. The host re-sends its ready
//! signal on every new connection.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::HostClient;
use crate::processor::{pump_messages, PumpExit};
use crate::reconnect::{reconnect, ReconnectConfig};
use crate::session::WalletHost;

/// Spawn the connection loop. Cancel `cancel` to stop it.
pub fn spawn_connection(
    client: HostClient,
    host: Arc<WalletHost>,
    outbound: mpsc::UnboundedReceiver<String>,
    reconnect_config: ReconnectConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(ws_url = %client.ws_url(), "Starting wallet host connection task");
        run_connection_loop(&client, &host, outbound, &reconnect_config, &cancel).await;
        tracing::info!("Wallet host connection task exited");
    })
}

async fn run_connection_loop(
    client: &HostClient,
    host: &WalletHost,
    mut outbound: mpsc::UnboundedReceiver<String>,
    reconnect_config: &ReconnectConfig,
    cancel: &CancellationToken,
) {
    let mut next = client.connect().await;

    loop {
        let conn = match next {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Wallet host connection failed, retrying");
                match reconnect(client, reconnect_config, cancel).await {
                    Some(conn) => conn,
                    None => return,
                }
            }
        };

        let exit = pump_messages(conn.ws_stream, &mut outbound, host, cancel).await;
        host.on_disconnected();

        match exit {
            PumpExit::Cancelled | PumpExit::OutboundClosed => return,
            PumpExit::Disconnected if cancel.is_cancelled() => return,
            PumpExit::Disconnected => {
                tracing::info!(
                    connection_id = %conn.connection_id,
                    "Wallet host connection lost, reconnecting",
                );
                next = match reconnect(client, reconnect_config, cancel).await {
                    Some(conn) => Ok(conn),
                    None => return,
                };
            }
        }
    }
}
