use serde::{Deserialize, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Derivation index of the HD root wallet.
pub const PRIMARY_WALLET_INDEX: u32 = 0;

/// Maximum number of embedded wallets (primary included) per user.
pub const MAX_EMBEDDED_WALLETS: usize = 10;

/// Blockchain family a wallet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Ethereum,
    Solana,
    /// Any chain family this SDK does not sign for, or none reported.
    #[serde(other)]
    #[default]
    Other,
}

impl ChainType {
    /// Compare two addresses using the chain's casing rules.
    ///
    /// EVM addresses are hex and may arrive checksummed or lowercased;
    /// Solana addresses are base58 and therefore case-sensitive.
    pub fn same_address(self, a: &str, b: &str) -> bool {
        match self {
            ChainType::Ethereum => a.eq_ignore_ascii_case(b),
            ChainType::Solana | ChainType::Other => a == b,
        }
    }
}

/// How the key material of an embedded wallet can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryMethod {
    /// Recovery share held by the auth backend.
    #[default]
    Privy,
    UserPasscode,
    GoogleDrive,
    Icloud,
    #[serde(other)]
    Other,
}
