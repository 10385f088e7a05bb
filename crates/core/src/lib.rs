//! Shared domain types for the walletlink embedded-wallet SDK.
//!
//! Everything here is pure data and pure functions: session tokens and
//! their expiry rules, the linked-account model returned by the auth
//! backend, and the derivation of embedded-wallet handles from it. The
//! I/O-bearing crates (`walletlink-host`, `walletlink-auth`) build on
//! these types.

pub mod account;
pub mod clock;
pub mod env;
pub mod error;
pub mod token;
pub mod types;
pub mod user;
pub mod wallet;

pub use account::{LinkedAccount, MappedAccount, RawLinkedAccount};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ConfigError;
pub use token::Token;
pub use types::{ChainType, RecoveryMethod, Timestamp};
pub use user::{RawUser, User};
pub use wallet::{derive_embedded_wallets, EmbeddedWallet};
