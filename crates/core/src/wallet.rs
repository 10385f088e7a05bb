//! Runtime embedded-wallet handles derived from a user's linked accounts.
//!
//! All embedded wallets of a user are HD-derived from one root (the
//! primary wallet, index 0). Every handle therefore carries the primary
//! wallet's address alongside its own: the wallet host addresses signing
//! requests by `(primary_wallet_address, hd_wallet_index)`.

use crate::account::{EmbeddedWalletAccount, LinkedAccount};
use crate::types::{ChainType, RecoveryMethod, PRIMARY_WALLET_INDEX};

/// A signer-capable embedded wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedWallet {
    pub address: String,
    pub chain_id: Option<String>,
    pub chain_type: ChainType,
    pub recovery_method: RecoveryMethod,
    pub hd_wallet_index: u32,
    pub primary_wallet_address: String,
}

impl EmbeddedWallet {
    fn from_account(account: &EmbeddedWalletAccount, primary_wallet_address: &str) -> Self {
        Self {
            address: account.address.clone(),
            chain_id: account.chain_id.clone(),
            chain_type: account.chain_type,
            recovery_method: account.recovery_method,
            hd_wallet_index: account.wallet_index,
            primary_wallet_address: primary_wallet_address.to_string(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.hd_wallet_index == PRIMARY_WALLET_INDEX
    }

    /// Whether this handle refers to `address` (chain casing rules apply).
    pub fn has_address(&self, address: &str) -> bool {
        self.chain_type.same_address(&self.address, address)
    }
}

/// Build wallet handles from linked accounts.
///
/// Returns an empty list when there is no embedded wallet at index 0:
/// derived wallets without a root are never surfaced.
pub fn derive_embedded_wallets(linked_accounts: &[LinkedAccount]) -> Vec<EmbeddedWallet> {
    let embedded: Vec<&EmbeddedWalletAccount> = linked_accounts
        .iter()
        .filter_map(LinkedAccount::as_embedded_wallet)
        .collect();

    let Some(primary) = embedded.iter().find(|account| account.is_primary()) else {
        return Vec::new();
    };

    embedded
        .iter()
        .map(|account| EmbeddedWallet::from_account(account, &primary.address))
        .collect()
}

/// Find a wallet handle by address.
pub fn find_wallet<'a>(wallets: &'a [EmbeddedWallet], address: &str) -> Option<&'a EmbeddedWallet> {
    wallets.iter().find(|wallet| wallet.has_address(address))
}

/// The primary (index 0) wallet handle, if any.
pub fn primary_wallet(wallets: &[EmbeddedWallet]) -> Option<&EmbeddedWallet> {
    wallets.iter().find(|wallet| wallet.is_primary())
}
