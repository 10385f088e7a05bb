//! Embedded-wallet session state machine.
//!
//! [`WalletHost`] sits on top of a [`RequestCorrelator`] and turns each
//! wallet operation into one correlated request. It tracks whether the
//! host has signalled readiness (nothing is sent before that) and which
//! operation is in progress, and serializes wallet-mutating operations so
//! that at most one create/recover is outstanding per session.
//!
//! Created once at start-up and shared as `Arc<WalletHost>`; the
//! transport's read side feeds it through [`WalletHost::on_message`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::IgnoredAny;
use tokio::sync::watch;
use walletlink_core::types::PRIMARY_WALLET_INDEX;
use walletlink_core::EmbeddedWallet;

use crate::config::HostConfig;
use crate::correlator::{Dispatch, RequestCorrelator};
use crate::error::EmbeddedWalletError;
use crate::events::HostEvent;
use crate::messages::{
    request_id, ConnectResponse, CreateAdditionalWalletRequest, CreateWalletRequest,
    CreateWalletResponse, RecoverResponse, SetRecoveryPasswordRequest, WalletAddressRequest,
    WalletRpcRequest,
};
use crate::rpc::{is_supported_method, RpcRequest, RpcResponse};
use crate::transport::Transport;

/// Observable state of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// The host has not sent its ready signal.
    Uninitialized,
    /// Ready, nothing in flight.
    Idle,
    CreatingWallet,
    Connecting,
    Recovering,
    Signing,
}

/// Session with the wallet host.
pub struct WalletHost {
    correlator: RequestCorrelator,
    config: HostConfig,
    ready: watch::Sender<bool>,
    /// In-flight operations, most recent last.
    activity: Arc<Mutex<Vec<HostState>>>,
    /// Held for the whole duration of a wallet-mutating operation.
    mutation: tokio::sync::Mutex<()>,
}

/// Marks an operation as in progress until dropped.
struct ActivityGuard {
    state: HostState,
    activity: Arc<Mutex<Vec<HostState>>>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        let mut activity = self.activity.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = activity.iter().rposition(|s| *s == self.state) {
            activity.remove(pos);
        }
    }
}

impl WalletHost {
    pub fn new(transport: Arc<dyn Transport>, config: HostConfig) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            correlator: RequestCorrelator::new(transport),
            config,
            ready,
            activity: Arc::new(Mutex::new(Vec::new())),
            mutation: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // ---- transport side ----

    /// Feed one inbound message from the transport.
    pub fn on_message(&self, raw: &str) -> Dispatch {
        let dispatch = self.correlator.on_message(raw);
        if dispatch == Dispatch::Ready && !self.is_ready() {
            tracing::info!("Wallet host ready");
            self.ready.send_replace(true);
        }
        dispatch
    }

    /// The channel to the host was lost: back to `Uninitialized` until the
    /// next ready signal, and fail everything still waiting.
    pub fn on_disconnected(&self) {
        if self.ready.send_replace(false) {
            tracing::warn!("Wallet host disconnected");
        }
        self.correlator.abandon_all();
    }

    // ---- state ----

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    pub fn state(&self) -> HostState {
        if !self.is_ready() {
            return HostState::Uninitialized;
        }
        self.activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
            .unwrap_or(HostState::Idle)
    }

    /// Wait for the ready signal, up to `timeout` (or the configured
    /// default).
    pub async fn wait_ready(&self, timeout: Option<Duration>) -> Result<(), EmbeddedWalletError> {
        let limit = timeout.unwrap_or(self.config.ready_timeout);
        let mut rx = self.ready.subscribe();
        // Bound to a local so the borrow of `rx` ends before `rx` is dropped.
        let outcome = tokio::time::timeout(limit, rx.wait_for(|ready| *ready)).await;
        match outcome {
            Ok(Ok(_)) => Ok(()),
            _ => Err(EmbeddedWalletError::NotReady),
        }
    }

    /// Requests currently awaiting a host response.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    /// Whether a queued outbound message still has a caller waiting on it.
    ///
    /// Messages without a request id are always live.
    pub fn is_request_live(&self, message: &str) -> bool {
        match request_id(message) {
            Some(id) => self.correlator.is_pending(&id),
            None => true,
        }
    }

    // ---- operations ----

    /// Create the primary wallet. Returns its address.
    pub async fn create_wallet(&self, access_token: &str) -> Result<String, EmbeddedWalletError> {
        self.ensure_ready()?;
        let _mutation = self.mutation.lock().await;
        let _activity = self.begin(HostState::CreatingWallet);

        let response: CreateWalletResponse = self
            .correlator
            .send(
                HostEvent::WalletCreate,
                &CreateWalletRequest { access_token },
                Some(self.config.create_timeout),
            )
            .await
            .map_err(|e| EmbeddedWalletError::from(e).into_create_failed())?;

        tracing::info!(address = %response.address, "Primary wallet created");
        Ok(response.address)
    }

    /// Derive the wallet at `hd_wallet_index` from the primary wallet.
    ///
    /// The index must be the next free one; the caller derives it from the
    /// current wallet count and enforces the wallet limit.
    pub async fn create_additional_wallet(
        &self,
        access_token: &str,
        primary_wallet_address: &str,
        hd_wallet_index: u32,
    ) -> Result<String, EmbeddedWalletError> {
        if hd_wallet_index == PRIMARY_WALLET_INDEX {
            return Err(EmbeddedWalletError::CreateAdditionalFailed(
                "index 0 is reserved for the primary wallet".into(),
            ));
        }
        self.ensure_ready()?;
        let _mutation = self.mutation.lock().await;
        let _activity = self.begin(HostState::CreatingWallet);

        let response: CreateWalletResponse = self
            .correlator
            .send(
                HostEvent::WalletCreateAdditional,
                &CreateAdditionalWalletRequest {
                    access_token,
                    primary_wallet_address,
                    hd_wallet_index,
                },
                Some(self.config.create_timeout),
            )
            .await
            .map_err(|e| EmbeddedWalletError::from(e).into_create_additional_failed())?;

        tracing::info!(
            address = %response.address,
            hd_wallet_index,
            "Additional wallet created",
        );
        Ok(response.address)
    }

    /// Load an existing wallet into the host.
    pub async fn connect(
        &self,
        access_token: &str,
        address: &str,
    ) -> Result<ConnectResponse, EmbeddedWalletError> {
        self.ensure_ready()?;
        let _activity = self.begin(HostState::Connecting);

        let response = self
            .correlator
            .send(
                HostEvent::WalletConnect,
                &WalletAddressRequest {
                    access_token,
                    address,
                },
                Some(self.config.request_timeout),
            )
            .await?;
        Ok(response)
    }

    /// Recover a wallet's key material on this device.
    pub async fn recover(
        &self,
        access_token: &str,
        address: &str,
    ) -> Result<RecoverResponse, EmbeddedWalletError> {
        self.ensure_ready()?;
        let _mutation = self.mutation.lock().await;
        let _activity = self.begin(HostState::Recovering);

        let response = self
            .correlator
            .send(
                HostEvent::WalletRecover,
                &WalletAddressRequest {
                    access_token,
                    address,
                },
                Some(self.config.request_timeout),
            )
            .await?;
        Ok(response)
    }

    /// Protect the wallet's recovery share with a user password.
    pub async fn set_recovery_password(
        &self,
        access_token: &str,
        address: &str,
        password: &str,
    ) -> Result<(), EmbeddedWalletError> {
        self.ensure_ready()?;
        let _mutation = self.mutation.lock().await;
        let _activity = self.begin(HostState::Recovering);

        let _: IgnoredAny = self
            .correlator
            .send(
                HostEvent::WalletSetRecoveryPassword,
                &SetRecoveryPasswordRequest {
                    access_token,
                    address,
                    password,
                },
                Some(self.config.request_timeout),
            )
            .await?;
        Ok(())
    }

    /// Forward a signing request for `wallet`.
    ///
    /// Methods outside the chain's allow-list are rejected here without
    /// touching the transport.
    pub async fn rpc(
        &self,
        access_token: &str,
        wallet: &EmbeddedWallet,
        request: &RpcRequest,
    ) -> Result<RpcResponse, EmbeddedWalletError> {
        if !is_supported_method(wallet.chain_type, &request.method) {
            return Err(EmbeddedWalletError::UnsupportedMethod {
                method: request.method.clone(),
                chain_type: wallet.chain_type,
            });
        }
        self.ensure_ready()?;
        let _activity = self.begin(HostState::Signing);

        tracing::debug!(
            method = %request.method,
            hd_wallet_index = wallet.hd_wallet_index,
            "Forwarding RPC request to wallet host",
        );

        let response = self
            .correlator
            .send(
                HostEvent::WalletRpc,
                &WalletRpcRequest {
                    access_token,
                    address: &wallet.primary_wallet_address,
                    hd_wallet_index: wallet.hd_wallet_index,
                    request,
                },
                Some(self.config.request_timeout),
            )
            .await?;
        Ok(response)
    }

    // ---- private helpers ----

    fn ensure_ready(&self) -> Result<(), EmbeddedWalletError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EmbeddedWalletError::NotReady)
        }
    }

    fn begin(&self, state: HostState) -> ActivityGuard {
        self.activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(state);
        ActivityGuard {
            state,
            activity: Arc::clone(&self.activity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;
    use walletlink_core::{ChainType, RecoveryMethod};

    use crate::transport::ChannelTransport;

    fn host() -> (Arc<WalletHost>, mpsc::UnboundedReceiver<String>) {
        let (transport, rx) = ChannelTransport::new();
        (
            Arc::new(WalletHost::new(Arc::new(transport), HostConfig::default())),
            rx,
        )
    }

    fn evm_wallet() -> EmbeddedWallet {
        EmbeddedWallet {
            address: "0xCHILD".into(),
            chain_id: Some("eip155:1".into()),
            chain_type: ChainType::Ethereum,
            recovery_method: RecoveryMethod::Privy,
            hd_wallet_index: 1,
            primary_wallet_address: "0xROOT".into(),
        }
    }

    #[tokio::test]
    async fn operations_before_ready_fail_without_sending() {
        let (host, mut rx) = host();
        assert_eq!(host.state(), HostState::Uninitialized);

        assert_matches!(host.create_wallet("tok").await, Err(EmbeddedWalletError::NotReady));
        assert_matches!(
            host.connect("tok", "0x1").await,
            Err(EmbeddedWalletError::NotReady)
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn ready_signal_moves_to_idle() {
        let (host, _rx) = host();
        assert_eq!(host.on_message("ready"), Dispatch::Ready);
        assert!(host.is_ready());
        assert_eq!(host.state(), HostState::Idle);
        host.wait_ready(Some(Duration::from_millis(10))).await.unwrap();
    }

    #[tokio::test]
    async fn wait_ready_resolves_when_signal_arrives_later() {
        let (host, _rx) = host();
        let waiter = {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.wait_ready(Some(Duration::from_secs(5))).await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        host.on_message(r#"{"event":"ready"}"#);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn wait_ready_times_out_as_not_ready() {
        let (host, _rx) = host();
        assert_matches!(
            host.wait_ready(Some(Duration::from_secs(1))).await,
            Err(EmbeddedWalletError::NotReady)
        );
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected_before_readiness_or_transport() {
        let (host, mut rx) = host();
        host.on_message("ready");

        let request = RpcRequest::new("eth_getBalance", vec![serde_json::json!("0xROOT")]);
        let err = host.rpc("tok", &evm_wallet(), &request).await.unwrap_err();
        assert_matches!(
            err,
            EmbeddedWalletError::UnsupportedMethod { ref method, chain_type: ChainType::Ethereum }
                if method == "eth_getBalance"
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn rpc_addresses_the_hd_root_and_index() {
        let (host, mut rx) = host();
        host.on_message("ready");

        let task = {
            let host = Arc::clone(&host);
            tokio::spawn(async move {
                let request = RpcRequest::new("personal_sign", vec![serde_json::json!("0x68656c6c6f")]);
                host.rpc("tok", &evm_wallet(), &request).await
            })
        };

        let raw = rx.recv().await.unwrap();
        let sent: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(sent["event"], "wallet:rpc");
        assert_eq!(sent["data"]["accessToken"], "tok");
        assert_eq!(sent["data"]["address"], "0xROOT");
        assert_eq!(sent["data"]["hdWalletIndex"], 1);
        assert_eq!(sent["data"]["request"]["method"], "personal_sign");
        assert_eq!(host.state(), HostState::Signing);

        let id = sent["id"].as_str().unwrap();
        host.on_message(&format!(
            r#"{{"id":"{id}","event":"wallet:rpc","data":{{"method":"personal_sign","data":"0xSIG"}}}}"#
        ));

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.data, "0xSIG");
        assert_eq!(host.state(), HostState::Idle);
    }

    #[tokio::test]
    async fn host_error_on_create_is_create_failed() {
        let (host, mut rx) = host();
        host.on_message("ready");

        let task = {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.create_wallet("tok").await })
        };
        let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(host.state(), HostState::CreatingWallet);

        let id = sent["id"].as_str().unwrap();
        host.on_message(&format!(
            r#"{{"id":"{id}","event":"wallet:create","error":{{"type":"conflict","message":"wallet exists"}}}}"#
        ));

        let err = task.await.unwrap().unwrap_err();
        assert_matches!(err, EmbeddedWalletError::CreateFailed(ref msg) if msg.contains("wallet exists"));
    }

    #[tokio::test]
    async fn additional_wallet_rejects_primary_index() {
        let (host, mut rx) = host();
        host.on_message("ready");
        assert_matches!(
            host.create_additional_wallet("tok", "0xROOT", 0).await,
            Err(EmbeddedWalletError::CreateAdditionalFailed(_))
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn mutations_are_serialized() {
        let (host, mut rx) = host();
        host.on_message("ready");

        let first = {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.create_wallet("tok").await })
        };
        let first_sent: serde_json::Value =
            serde_json::from_str(&rx.recv().await.unwrap()).unwrap();

        let second = {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.recover("tok", "0xROOT").await })
        };
        tokio::task::yield_now().await;
        // The recover request waits for the create to finish.
        assert!(rx.try_recv().is_err());

        let id = first_sent["id"].as_str().unwrap();
        host.on_message(&format!(
            r#"{{"id":"{id}","event":"wallet:create","data":{{"address":"0xROOT"}}}}"#
        ));
        assert_eq!(first.await.unwrap().unwrap(), "0xROOT");

        let second_sent: serde_json::Value =
            serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(second_sent["event"], "wallet:recover");
        let id = second_sent["id"].as_str().unwrap();
        host.on_message(&format!(
            r#"{{"id":"{id}","event":"wallet:recover","data":{{"address":"0xROOT"}}}}"#
        ));
        assert_eq!(second.await.unwrap().unwrap().address, "0xROOT");
    }

    #[tokio::test]
    async fn disconnect_resets_readiness_and_abandons_requests() {
        let (host, mut rx) = host();
        host.on_message("ready");

        let task = {
            let host = Arc::clone(&host);
            tokio::spawn(async move { host.connect("tok", "0xROOT").await })
        };
        rx.recv().await.unwrap();

        host.on_disconnected();
        assert_eq!(host.state(), HostState::Uninitialized);
        assert_matches!(task.await.unwrap(), Err(EmbeddedWalletError::Protocol(_)));
        assert_eq!(host.pending_requests(), 0);
    }
}
