use walletlink_core::env;
use walletlink_core::token::DEFAULT_EXPIRATION_PADDING_SECS;
use walletlink_core::ConfigError;

/// Default auth backend base URL.
const DEFAULT_BASE_URL: &str = "https://auth.privy.io";
/// Default native application identifier sent with every request.
const DEFAULT_NATIVE_APP_ID: &str = "walletlink";
/// Lifetime assigned to opaque refresh tokens, in days.
const DEFAULT_REFRESH_LIFETIME_DAYS: i64 = 30;

/// Auth backend configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the auth backend, without the `/api/v1` suffix.
    pub base_url: String,
    pub app_id: String,
    pub client_id: String,
    pub native_app_identifier: String,
    /// Tokens count as expired this long before their real expiry.
    pub expiration_padding: chrono::Duration,
    pub refresh_token_lifetime: chrono::Duration,
}

impl AuthConfig {
    /// Configuration with defaults for everything but the app credentials.
    pub fn new(app_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: app_id.into(),
            client_id: client_id.into(),
            native_app_identifier: DEFAULT_NATIVE_APP_ID.to_string(),
            expiration_padding: chrono::Duration::seconds(DEFAULT_EXPIRATION_PADDING_SECS),
            refresh_token_lifetime: chrono::Duration::days(DEFAULT_REFRESH_LIFETIME_DAYS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                            | Default                 |
    /// |------------------------------------|-------------------------|
    /// | `WALLETLINK_APP_ID`                | required                |
    /// | `WALLETLINK_CLIENT_ID`             | required                |
    /// | `WALLETLINK_AUTH_URL`              | `https://auth.privy.io` |
    /// | `WALLETLINK_NATIVE_APP_ID`         | `walletlink`            |
    /// | `WALLETLINK_TOKEN_PADDING_SECS`    | `30`                    |
    /// | `WALLETLINK_REFRESH_LIFETIME_DAYS` | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_id = env::required("WALLETLINK_APP_ID")?;
        let client_id = env::required("WALLETLINK_CLIENT_ID")?;
        let base_url = env::string_or("WALLETLINK_AUTH_URL", DEFAULT_BASE_URL);
        let native_app_identifier = env::string_or("WALLETLINK_NATIVE_APP_ID", DEFAULT_NATIVE_APP_ID);
        let padding_secs = env::parse_or(
            "WALLETLINK_TOKEN_PADDING_SECS",
            "i64",
            DEFAULT_EXPIRATION_PADDING_SECS,
        )?;
        let lifetime_days = env::parse_or(
            "WALLETLINK_REFRESH_LIFETIME_DAYS",
            "i64",
            DEFAULT_REFRESH_LIFETIME_DAYS,
        )?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            client_id,
            native_app_identifier,
            expiration_padding: duration(
                "WALLETLINK_TOKEN_PADDING_SECS",
                padding_secs,
                chrono::Duration::try_seconds,
            )?,
            refresh_token_lifetime: duration(
                "WALLETLINK_REFRESH_LIFETIME_DAYS",
                lifetime_days,
                chrono::Duration::try_days,
            )?,
        })
    }
}

/// Convert a configured count into a duration, rejecting negative values
/// and values `chrono` cannot represent.
fn duration(
    name: &'static str,
    count: i64,
    convert: fn(i64) -> Option<chrono::Duration>,
) -> Result<chrono::Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name,
        expected: "non-negative duration",
        value: count.to_string(),
    };
    if count < 0 {
        return Err(invalid());
    }
    convert(count).ok_or_else(invalid)
}
