//! Exponential backoff for wallet host reconnection.
//!
//! [`reconnect`] keeps dialing the host with growing delays until a
//! connection succeeds or the [`CancellationToken`] fires.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::{HostClient, HostConnection};

/// Tunable parameters for the backoff schedule.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Iterator over successive backoff delays, clamped to `max_delay`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            next: config.initial_delay.min(config.max_delay),
            max: config.max_delay,
            multiplier: config.multiplier,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = current.mul_f64(self.multiplier).min(self.max);
        Some(current)
    }
}

/// Dial the host until it answers.
///
/// Returns `None` if `cancel` fires first.
pub async fn reconnect(
    client: &HostClient,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<HostConnection> {
    for (attempt, delay) in Backoff::new(config).enumerate() {
        let attempt = attempt + 1;
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Wallet host reconnect cancelled");
                return None;
            }
            result = client.connect() => match result {
                Ok(conn) => {
                    tracing::info!(attempt, "Reconnected to wallet host");
                    return Some(conn);
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Wallet host reconnect failed",
                    );
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }
    }
    None
}
