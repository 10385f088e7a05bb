//! The wallet facade.
//!
//! [`WalletClient`] fetches a valid access token for every wallet host
//! call and applies the creation policy: one primary wallet per user,
//! additional wallets only on request, [`MAX_EMBEDDED_WALLETS`] at most,
//! each new wallet at the next free HD index.

use std::sync::Arc;

use tokio::sync::Mutex;
use walletlink_auth::{AuthError, AuthSession};
use walletlink_core::types::MAX_EMBEDDED_WALLETS;
use walletlink_core::wallet::{find_wallet, primary_wallet};
use walletlink_core::EmbeddedWallet;
use walletlink_host::messages::RecoverResponse;
use walletlink_host::{EmbeddedWalletError, RpcRequest, RpcResponse, WalletHost};

use crate::error::ClientError;
use crate::task::fire_and_forget;

pub struct WalletClient {
    auth: Arc<AuthSession>,
    host: Arc<WalletHost>,
    /// Held for a whole create sequence so that two creations never pick
    /// the same HD index.
    creation: Mutex<()>,
}

impl WalletClient {
    pub fn new(auth: Arc<AuthSession>, host: Arc<WalletHost>) -> Self {
        Self {
            auth,
            host,
            creation: Mutex::new(()),
        }
    }

    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub fn host(&self) -> &Arc<WalletHost> {
        &self.host
    }

    /// The authenticated user's embedded wallets, primary first if present.
    pub async fn embedded_wallets(&self) -> Result<Vec<EmbeddedWallet>, ClientError> {
        let user = self.auth.user().await.ok_or(AuthError::NotAuthenticated)?;
        let mut wallets = user.embedded_wallets();
        wallets.sort_by_key(|wallet| wallet.hd_wallet_index);
        Ok(wallets)
    }

    /// The wallet handle for `address`, if the user owns one.
    pub async fn wallet(&self, address: &str) -> Result<Option<EmbeddedWallet>, ClientError> {
        let wallets = self.embedded_wallets().await?;
        Ok(find_wallet(&wallets, address).cloned())
    }

    /// Create the primary wallet, or with `allow_additional` the next
    /// derived one once a primary exists.
    ///
    /// On success the new wallet is loaded into the host in the
    /// background.
    pub async fn create_wallet(&self, allow_additional: bool) -> Result<EmbeddedWallet, ClientError> {
        let _creation = self.creation.lock().await;

        let access_token = self.auth.get_access_token().await?;
        let wallets = self.embedded_wallets().await?;

        let address = match primary_wallet(&wallets) {
            None => self.host.create_wallet(&access_token).await?,
            Some(_) if !allow_additional => {
                return Err(EmbeddedWalletError::CreateFailed("wallet already exists".into()).into());
            }
            Some(_) if wallets.len() >= MAX_EMBEDDED_WALLETS => {
                return Err(EmbeddedWalletError::CreateAdditionalFailed(format!(
                    "user already has the maximum of {MAX_EMBEDDED_WALLETS} embedded wallets"
                ))
                .into());
            }
            Some(primary) => {
                let hd_wallet_index = wallets.len() as u32;
                self.host
                    .create_additional_wallet(&access_token, &primary.address, hd_wallet_index)
                    .await?
            }
        };

        // The new account only shows up on the user after a refresh.
        let user = self.auth.refresh_session(true).await?;
        let wallets = user.embedded_wallets();
        let wallet = find_wallet(&wallets, &address).cloned().ok_or_else(|| {
            EmbeddedWalletError::CreateFailed(format!(
                "created wallet {address} is missing from the refreshed user"
            ))
        })?;

        tracing::info!(
            address = %wallet.address,
            hd_wallet_index = wallet.hd_wallet_index,
            "Embedded wallet ready",
        );
        self.connect_in_background(&wallet);
        Ok(wallet)
    }

    /// Forward a signing request for `wallet` to the host.
    pub async fn rpc(
        &self,
        wallet: &EmbeddedWallet,
        request: &RpcRequest,
    ) -> Result<RpcResponse, ClientError> {
        let access_token = self.auth.get_access_token().await?;
        Ok(self.host.rpc(&access_token, wallet, request).await?)
    }

    pub async fn recover(&self, wallet: &EmbeddedWallet) -> Result<RecoverResponse, ClientError> {
        let access_token = self.auth.get_access_token().await?;
        Ok(self
            .host
            .recover(&access_token, &wallet.primary_wallet_address)
            .await?)
    }

    pub async fn set_recovery_password(
        &self,
        wallet: &EmbeddedWallet,
        password: &str,
    ) -> Result<(), ClientError> {
        let access_token = self.auth.get_access_token().await?;
        self.host
            .set_recovery_password(&access_token, &wallet.primary_wallet_address, password)
            .await?;
        Ok(())
    }

    fn connect_in_background(&self, wallet: &EmbeddedWallet) {
        let auth = Arc::clone(&self.auth);
        let host = Arc::clone(&self.host);
        let address = wallet.primary_wallet_address.clone();

        fire_and_forget("wallet:connect", async move {
            let access_token = auth.get_access_token().await?;
            host.connect(&access_token, &address).await?;
            Ok::<_, ClientError>(())
        });
    }
}
