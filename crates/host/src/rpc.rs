//! Signing RPC requests and the per-chain method allow-list.

use serde::{Deserialize, Serialize};
use walletlink_core::ChainType;

/// EVM methods the wallet host will sign for.
pub const ETHEREUM_SIGNING_METHODS: &[&str] = &[
    "eth_sign",
    "personal_sign",
    "eth_signTypedData_v4",
    "eth_signTransaction",
    "eth_sendTransaction",
    "eth_populateTransactionRequest",
];

/// Solana equivalents of the EVM signing methods.
pub const SOLANA_SIGNING_METHODS: &[&str] =
    &["signMessage", "signTransaction", "signAndSendTransaction"];

/// A JSON-RPC style request forwarded to the wallet host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// The host's answer to a `wallet:rpc` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse {
    pub method: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Methods a wallet of `chain_type` may forward to the host.
pub fn supported_methods(chain_type: ChainType) -> &'static [&'static str] {
    match chain_type {
        ChainType::Ethereum => ETHEREUM_SIGNING_METHODS,
        ChainType::Solana => SOLANA_SIGNING_METHODS,
        ChainType::Other => &[],
    }
}

pub fn is_supported_method(chain_type: ChainType, method: &str) -> bool {
    supported_methods(chain_type).contains(&method)
}
