//! `walletlink-client` library crate.
//!
//! [`WalletClient`] is the facade game and application code talks to: it
//! combines an [`AuthSession`](walletlink_auth::AuthSession) with a
//! [`WalletHost`](walletlink_host::WalletHost) and owns the wallet
//! creation policy. The `walletlink` binary entrypoint lives in
//! `main.rs`.

pub mod client;
pub mod config;
pub mod error;
pub mod task;

pub use client::WalletClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use task::{fire_and_forget, fire_and_forget_with};
