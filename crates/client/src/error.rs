use walletlink_auth::AuthError;
use walletlink_host::EmbeddedWalletError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Wallet(#[from] EmbeddedWalletError),
}
