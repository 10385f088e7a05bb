use std::collections::HashMap;

use serde::Deserialize;

use crate::account::{
    deserialize_linked_accounts, public_linked_accounts, LinkedAccount, RawLinkedAccount,
};
use crate::types::Timestamp;
use crate::wallet::{derive_embedded_wallets, EmbeddedWallet};

/// The user object embedded in every session response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_linked_accounts")]
    pub linked_accounts: Vec<RawLinkedAccount>,
    /// Values may be strings, numbers or booleans on the wire.
    #[serde(default)]
    pub custom_metadata: HashMap<String, serde_json::Value>,
}

/// Read-only view of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub created_at: Option<Timestamp>,
    pub linked_accounts: Vec<LinkedAccount>,
    pub custom_metadata: HashMap<String, String>,
}

impl User {
    pub fn from_raw(raw: RawUser) -> Self {
        let custom_metadata = raw
            .custom_metadata
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        Self {
            id: raw.id,
            created_at: raw.created_at,
            linked_accounts: public_linked_accounts(raw.linked_accounts),
            custom_metadata,
        }
    }

    /// Runtime handles for every embedded wallet reachable from the primary.
    pub fn embedded_wallets(&self) -> Vec<EmbeddedWallet> {
        derive_embedded_wallets(&self.linked_accounts)
    }

    /// The first linked email address, if any.
    pub fn email(&self) -> Option<&str> {
        self.linked_accounts.iter().find_map(|account| match account {
            LinkedAccount::Email(email) => Some(email.address.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_maps_accounts_and_stringifies_metadata() {
        let raw: RawUser = serde_json::from_str(
            r#"{
                "id": "did:privy:abc",
                "created_at": 1700000000,
                "linked_accounts": [
                    {"type":"email","address":"player@example.com"},
                    {"type":"wallet","address":"0xAAA","chain_type":"ethereum",
                     "wallet_client_type":"privy","connector_type":"embedded","wallet_index":0},
                    {"type":"wallet","address":"0xEXT","chain_type":"ethereum",
                     "wallet_client_type":"rainbow","connector_type":"wallet_connect"}
                ],
                "custom_metadata": {"team": "red", "level": 7, "vip": true}
            }"#,
        )
        .unwrap();

        let user = User::from_raw(raw);
        assert_eq!(user.id, "did:privy:abc");
        assert_eq!(user.linked_accounts.len(), 2);
        assert_eq!(user.email(), Some("player@example.com"));
        assert_eq!(user.custom_metadata["team"], "red");
        assert_eq!(user.custom_metadata["level"], "7");
        assert_eq!(user.custom_metadata["vip"], "true");
        assert_eq!(user.embedded_wallets().len(), 1);
    }

    #[test]
    fn one_bad_linked_account_does_not_fail_the_user() {
        let raw: RawUser = serde_json::from_str(
            r#"{
                "id": "did:privy:mixed",
                "linked_accounts": [
                    {"type":"wallet","address":"0xEXT","wallet_client_type":"metamask",
                     "connector_type":"injected","imported":null},
                    {"type":"wallet","chain_type":"ethereum"},
                    {"type":"email","address":"player@example.com"},
                    {"type":"wallet","address":"0xAAA","chain_type":"ethereum",
                     "wallet_client_type":"privy","connector_type":"embedded","wallet_index":0}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(raw.linked_accounts.len(), 4);

        let user = User::from_raw(raw);
        assert_eq!(user.email(), Some("player@example.com"));
        assert_eq!(user.linked_accounts.len(), 2);
        assert_eq!(user.embedded_wallets().len(), 1);
    }

    #[test]
    fn null_linked_accounts_reads_as_empty() {
        let raw: RawUser =
            serde_json::from_str(r#"{"id":"did:privy:null","linked_accounts":null}"#).unwrap();
        assert!(raw.linked_accounts.is_empty());
    }

    #[test]
    fn missing_optional_fields_default() {
        let raw: RawUser = serde_json::from_str(r#"{"id":"did:privy:empty"}"#).unwrap();
        let user = User::from_raw(raw);
        assert!(user.linked_accounts.is_empty());
        assert!(user.custom_metadata.is_empty());
        assert!(user.created_at.is_none());
        assert!(user.embedded_wallets().is_empty());
    }
}
