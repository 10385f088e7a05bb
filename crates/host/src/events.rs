//! Protocol event names understood by the wallet host.

use std::fmt;

/// Every event name in the wallet host protocol vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// Out-of-band signal that the host finished initializing.
    Ready,
    /// Create the primary (HD root) wallet.
    WalletCreate,
    /// Derive an additional wallet from the primary.
    WalletCreateAdditional,
    /// Load an existing wallet into the host.
    WalletConnect,
    /// Recover a wallet's key material.
    WalletRecover,
    /// Forward a signing RPC call.
    WalletRpc,
    /// Protect the recovery share with a user password.
    WalletSetRecoveryPassword,
}

impl HostEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            HostEvent::Ready => "ready",
            HostEvent::WalletCreate => "wallet:create",
            HostEvent::WalletCreateAdditional => "wallet:create-additional",
            HostEvent::WalletConnect => "wallet:connect",
            HostEvent::WalletRecover => "wallet:recover",
            HostEvent::WalletRpc => "wallet:rpc",
            HostEvent::WalletSetRecoveryPassword => "wallet:set-recovery-password",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let event = match name {
            "ready" => HostEvent::Ready,
            "wallet:create" => HostEvent::WalletCreate,
            "wallet:create-additional" => HostEvent::WalletCreateAdditional,
            "wallet:connect" => HostEvent::WalletConnect,
            "wallet:recover" => HostEvent::WalletRecover,
            "wallet:rpc" => HostEvent::WalletRpc,
            "wallet:set-recovery-password" => HostEvent::WalletSetRecoveryPassword,
            _ => return None,
        };
        Some(event)
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_parse() {
        for event in [
            HostEvent::Ready,
            HostEvent::WalletCreate,
            HostEvent::WalletCreateAdditional,
            HostEvent::WalletConnect,
            HostEvent::WalletRecover,
            HostEvent::WalletRpc,
            HostEvent::WalletSetRecoveryPassword,
        ] {
            assert_eq!(HostEvent::parse(event.as_str()), Some(event));
        }
    }

    #[test]
    fn unknown_name_does_not_parse() {
        assert_eq!(HostEvent::parse("wallet:export"), None);
    }
}
