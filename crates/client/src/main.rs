//! `walletlink` -- embedded wallet session daemon.
//!
//! Connects to a wallet host over WebSocket, restores the user's auth
//! session, lists the user's embedded wallets and creates the primary
//! wallet when the user has none.
//!
//! # Environment variables
//!
//! | Variable                   | Required | Default                 | Description                          |
//! |----------------------------|----------|-------------------------|--------------------------------------|
//! | `WALLETLINK_APP_ID`        | yes      | --                      | Auth backend application id          |
//! | `WALLETLINK_CLIENT_ID`     | yes      | --                      | Auth backend client id               |
//! | `WALLETLINK_HOST_WS_URL`   | yes      | --                      | Wallet host WebSocket endpoint       |
//! | `WALLETLINK_AUTH_URL`      | no       | `https://auth.privy.io` | Auth backend base URL                |
//! | `WALLETLINK_TOKEN_FILE`    | no       | --                      | Persist the session in this file     |
//! | `WALLETLINK_REFRESH_TOKEN` | no       | --                      | Seed the in-memory session store     |
//!
//! Timeouts and token padding are described on `HostConfig::from_env`
//! and `AuthConfig::from_env`.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walletlink_auth::{
    AuthApi, AuthSession, AuthState, FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore,
};
use walletlink_client::{ClientConfig, WalletClient};
use walletlink_core::{Clock, SystemClock, Token};
use walletlink_host::client::HostClient;
use walletlink_host::connection::spawn_connection;
use walletlink_host::{ChannelTransport, WalletHost};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walletlink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().context("Invalid walletlink configuration")?;

    tracing::info!(
        host_ws_url = %config.host_ws_url,
        auth_url = %config.auth.base_url,
        "Starting walletlink",
    );

    // --- Wallet host connection ---
    let (transport, outbound) = ChannelTransport::new();
    let host = Arc::new(WalletHost::new(Arc::new(transport), config.host.clone()));
    let cancel = CancellationToken::new();
    let connection = spawn_connection(
        HostClient::new(config.host_ws_url.clone()),
        Arc::clone(&host),
        outbound,
        config.host.reconnect.clone(),
        cancel.clone(),
    );

    // --- Auth session ---
    let auth = Arc::new(AuthSession::new(
        Arc::new(AuthApi::new(&config.auth)),
        token_store(&config),
        &config.auth,
    ));
    auth.set_auth_state_change_callback(|state| {
        tracing::info!(?state, "Auth state changed");
    });

    let result = run(&host, &auth).await;

    cancel.cancel();
    if let Err(e) = connection.await {
        tracing::error!(error = %e, "Wallet host connection task panicked");
    }
    result
}

async fn run(host: &Arc<WalletHost>, auth: &Arc<AuthSession>) -> anyhow::Result<()> {
    host.wait_ready(None)
        .await
        .context("Wallet host did not become ready")?;

    if auth.initialize().await != AuthState::Authenticated {
        anyhow::bail!(
            "No session to restore; set WALLETLINK_REFRESH_TOKEN or WALLETLINK_TOKEN_FILE"
        );
    }

    let client = WalletClient::new(Arc::clone(auth), Arc::clone(host));
    let mut wallets = client.embedded_wallets().await?;
    if wallets.is_empty() {
        tracing::info!("User has no embedded wallet, creating one");
        wallets.push(client.create_wallet(false).await?);
    }

    for wallet in &wallets {
        tracing::info!(
            address = %wallet.address,
            chain_type = ?wallet.chain_type,
            hd_wallet_index = wallet.hd_wallet_index,
            "Embedded wallet",
        );
    }
    Ok(())
}

fn token_store(config: &ClientConfig) -> Arc<dyn TokenStore> {
    if let Some(path) = &config.token_file {
        return Arc::new(FileTokenStore::new(path.clone()));
    }
    match &config.seed_refresh_token {
        Some(value) => Arc::new(MemoryTokenStore::with_tokens(StoredTokens {
            refresh_token: Token::with_lifetime(
                value.clone(),
                SystemClock.now(),
                config.auth.refresh_token_lifetime,
            ),
        })),
        None => Arc::new(MemoryTokenStore::new()),
    }
}
