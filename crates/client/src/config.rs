use std::path::PathBuf;

use walletlink_auth::AuthConfig;
use walletlink_core::{env, ConfigError};
use walletlink_host::HostConfig;

/// Everything the `walletlink` binary needs to start.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    pub host: HostConfig,
    /// WebSocket endpoint of the wallet host.
    pub host_ws_url: String,
    /// Persist the session here; `None` keeps it in memory.
    pub token_file: Option<PathBuf>,
    /// Refresh token seeding the in-memory store.
    pub seed_refresh_token: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// In addition to the variables read by [`AuthConfig::from_env`] and
    /// [`HostConfig::from_env`]:
    ///
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `WALLETLINK_HOST_WS_URL`   | required |
    /// | `WALLETLINK_TOKEN_FILE`    | unset    |
    /// | `WALLETLINK_REFRESH_TOKEN` | unset    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            auth: AuthConfig::from_env()?,
            host: HostConfig::from_env()?,
            host_ws_url: env::required("WALLETLINK_HOST_WS_URL")?,
            token_file: env::optional("WALLETLINK_TOKEN_FILE").map(PathBuf::from),
            seed_refresh_token: env::optional("WALLETLINK_REFRESH_TOKEN"),
        })
    }
}
