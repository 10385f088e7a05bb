//! Linked-account records and their mapping into the public model.
//!
//! The auth backend returns a heterogeneous `linked_accounts` array whose
//! elements are discriminated by a `"type"` field. [`RawLinkedAccount`]
//! mirrors that wire shape; [`map_to_public`] converts each record into
//! the typed [`LinkedAccount`] union, or reports it as
//! [`MappedAccount::Unrepresented`] when the record has no public form
//! (external wallets, unknown record types).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{ChainType, RecoveryMethod, Timestamp, PRIMARY_WALLET_INDEX};

/// `wallet_client_type` of wallets whose keys live in the wallet host.
pub const EMBEDDED_WALLET_CLIENT_TYPE: &str = "privy";

/// `connector_type` of wallets whose keys live in the wallet host.
pub const EMBEDDED_CONNECTOR_TYPE: &str = "embedded";

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// Verification timestamps shared by every linked-account record.
///
/// The backend sends them as Unix seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Verification {
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub verified_at: Option<Timestamp>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub first_verified_at: Option<Timestamp>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub latest_verified_at: Option<Timestamp>,
}

/// A linked-account record exactly as the auth backend returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawLinkedAccount {
    Wallet(RawWalletAccount),
    Email(RawEmailAccount),
    GoogleOauth(RawOAuthAccount),
    DiscordOauth(RawOAuthAccount),
    AppleOauth(RawOAuthAccount),
    /// Any record type this SDK does not model (phone, farcaster, ...).
    #[serde(other)]
    Unknown,
}

impl RawLinkedAccount {
    /// Decode one record, degrading to [`RawLinkedAccount::Unknown`] when
    /// it does not match the shape its `"type"` declares.
    pub fn from_value(value: Value) -> Self {
        let record_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::debug!(%record_type, error = %e, "Skipping malformed linked account");
            RawLinkedAccount::Unknown
        })
    }
}

/// `deserialize_with` helper for a `linked_accounts` array.
///
/// Records are decoded one at a time so a single malformed entry cannot
/// fail the enclosing user. `null` reads as an empty list.
pub fn deserialize_linked_accounts<'de, D>(
    deserializer: D,
) -> Result<Vec<RawLinkedAccount>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records.into_iter().map(RawLinkedAccount::from_value).collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWalletAccount {
    pub address: String,
    /// External wallets are not always reported with a chain family.
    #[serde(default)]
    pub chain_type: ChainType,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub wallet_client_type: Option<String>,
    #[serde(default)]
    pub connector_type: Option<String>,
    #[serde(default)]
    pub recovery_method: Option<RecoveryMethod>,
    /// Sent as `null` by some backend versions.
    #[serde(default)]
    pub imported: Option<bool>,
    /// Absent on records created before HD wallets existed; those are
    /// always the root wallet.
    #[serde(default)]
    pub wallet_index: Option<u32>,
    #[serde(flatten)]
    pub verification: Verification,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEmailAccount {
    pub address: String,
    #[serde(flatten)]
    pub verification: Verification,
}

/// Shared shape of the Google, Discord and Apple OAuth records.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOAuthAccount {
    pub subject: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub verification: Verification,
}

// ---------------------------------------------------------------------------
// Public model
// ---------------------------------------------------------------------------

/// A linked account as exposed to SDK consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkedAccount {
    EmbeddedWallet(EmbeddedWalletAccount),
    Email(EmailAccount),
    GoogleOAuth(GoogleOAuthAccount),
    DiscordOAuth(DiscordOAuthAccount),
    AppleOAuth(AppleOAuthAccount),
    /// A wallet whose keys the wallet host does not hold. Opaque: it can
    /// never be turned into a signer.
    UnknownExternalWallet(ExternalWalletAccount),
}

impl LinkedAccount {
    pub fn verification(&self) -> &Verification {
        match self {
            LinkedAccount::EmbeddedWallet(a) => &a.verification,
            LinkedAccount::Email(a) => &a.verification,
            LinkedAccount::GoogleOAuth(a) => &a.verification,
            LinkedAccount::DiscordOAuth(a) => &a.verification,
            LinkedAccount::AppleOAuth(a) => &a.verification,
            LinkedAccount::UnknownExternalWallet(a) => &a.verification,
        }
    }

    pub fn as_embedded_wallet(&self) -> Option<&EmbeddedWalletAccount> {
        match self {
            LinkedAccount::EmbeddedWallet(wallet) => Some(wallet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedWalletAccount {
    pub address: String,
    pub chain_id: Option<String>,
    pub chain_type: ChainType,
    /// HD derivation index; `0` is the primary (root) wallet.
    pub wallet_index: u32,
    pub recovery_method: RecoveryMethod,
    pub imported: bool,
    pub verification: Verification,
}

impl EmbeddedWalletAccount {
    pub fn is_primary(&self) -> bool {
        self.wallet_index == PRIMARY_WALLET_INDEX
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAccount {
    pub address: String,
    pub verification: Verification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleOAuthAccount {
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub verification: Verification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordOAuthAccount {
    pub subject: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub verification: Verification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppleOAuthAccount {
    pub subject: String,
    pub email: Option<String>,
    pub verification: Verification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalWalletAccount {
    pub address: String,
    pub chain_type: ChainType,
    pub wallet_client_type: Option<String>,
    pub connector_type: Option<String>,
    pub verification: Verification,
}

/// Outcome of mapping one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedAccount {
    Public(LinkedAccount),
    /// The record is valid but has no place in the public account list.
    Unrepresented,
}

impl MappedAccount {
    pub fn into_public(self) -> Option<LinkedAccount> {
        match self {
            MappedAccount::Public(account) => Some(account),
            MappedAccount::Unrepresented => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Map a raw record into the public model.
///
/// Only wallets created by the wallet host (`privy` client, `embedded`
/// connector) become [`LinkedAccount::EmbeddedWallet`]; every other
/// wallet record is [`MappedAccount::Unrepresented`].
pub fn map_to_public(raw: RawLinkedAccount) -> MappedAccount {
    let account = match raw {
        RawLinkedAccount::Wallet(wallet) => {
            if !is_embedded_wallet(&wallet) {
                return MappedAccount::Unrepresented;
            }
            LinkedAccount::EmbeddedWallet(EmbeddedWalletAccount {
                address: wallet.address,
                chain_id: wallet.chain_id,
                chain_type: wallet.chain_type,
                wallet_index: wallet.wallet_index.unwrap_or(PRIMARY_WALLET_INDEX),
                recovery_method: wallet.recovery_method.unwrap_or_default(),
                imported: wallet.imported.unwrap_or(false),
                verification: wallet.verification,
            })
        }
        RawLinkedAccount::Email(email) => LinkedAccount::Email(EmailAccount {
            address: email.address,
            verification: email.verification,
        }),
        RawLinkedAccount::GoogleOauth(oauth) => LinkedAccount::GoogleOAuth(GoogleOAuthAccount {
            subject: oauth.subject,
            email: oauth.email,
            name: oauth.name,
            verification: oauth.verification,
        }),
        RawLinkedAccount::DiscordOauth(oauth) => {
            LinkedAccount::DiscordOAuth(DiscordOAuthAccount {
                subject: oauth.subject,
                email: oauth.email,
                username: oauth.username,
                verification: oauth.verification,
            })
        }
        RawLinkedAccount::AppleOauth(oauth) => LinkedAccount::AppleOAuth(AppleOAuthAccount {
            subject: oauth.subject,
            email: oauth.email,
            verification: oauth.verification,
        }),
        RawLinkedAccount::Unknown => return MappedAccount::Unrepresented,
    };
    MappedAccount::Public(account)
}

/// Map a whole `linked_accounts` array, dropping unrepresented records.
pub fn public_linked_accounts(raws: Vec<RawLinkedAccount>) -> Vec<LinkedAccount> {
    let total = raws.len();
    let accounts: Vec<LinkedAccount> = raws
        .into_iter()
        .filter_map(|raw| map_to_public(raw).into_public())
        .collect();

    let dropped = total - accounts.len();
    if dropped > 0 {
        tracing::debug!(dropped, total, "Dropped linked accounts with no public form");
    }
    accounts
}

fn is_embedded_wallet(wallet: &RawWalletAccount) -> bool {
    wallet.wallet_client_type.as_deref() == Some(EMBEDDED_WALLET_CLIENT_TYPE)
        && wallet.connector_type.as_deref() == Some(EMBEDDED_CONNECTOR_TYPE)
}
