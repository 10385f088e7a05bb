use std::time::Duration;

use walletlink_core::env;
use walletlink_core::ConfigError;

use crate::reconnect::ReconnectConfig;

/// Default timeout for correlated requests, in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default timeout for wallet creation requests, in seconds.
const DEFAULT_CREATE_TIMEOUT_SECS: u64 = 20;
/// Default time to wait for the host's ready signal, in seconds.
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// Wallet host protocol configuration.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Timeout applied to connect, recover and RPC requests.
    pub request_timeout: Duration,
    /// Timeout applied to create and create-additional requests.
    pub create_timeout: Duration,
    /// How long [`WalletHost::wait_ready`](crate::WalletHost::wait_ready)
    /// waits by default.
    pub ready_timeout: Duration,
    /// Backoff used by the WebSocket connection task.
    pub reconnect: ReconnectConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            create_timeout: Duration::from_secs(DEFAULT_CREATE_TIMEOUT_SECS),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default |
    /// |-----------------------------------|---------|
    /// | `WALLETLINK_REQUEST_TIMEOUT_SECS` | `30`    |
    /// | `WALLETLINK_CREATE_TIMEOUT_SECS`  | `20`    |
    /// | `WALLETLINK_READY_TIMEOUT_SECS`   | `30`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let request_timeout_secs = env::parse_or(
            "WALLETLINK_REQUEST_TIMEOUT_SECS",
            "u64",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let create_timeout_secs = env::parse_or(
            "WALLETLINK_CREATE_TIMEOUT_SECS",
            "u64",
            DEFAULT_CREATE_TIMEOUT_SECS,
        )?;
        let ready_timeout_secs = env::parse_or(
            "WALLETLINK_READY_TIMEOUT_SECS",
            "u64",
            DEFAULT_READY_TIMEOUT_SECS,
        )?;

        Ok(Self {
            request_timeout: Duration::from_secs(request_timeout_secs),
            create_timeout: Duration::from_secs(create_timeout_secs),
            ready_timeout: Duration::from_secs(ready_timeout_secs),
            reconnect: ReconnectConfig::default(),
        })
    }
}
