//! Wallet host protocol client.
//!
//! The wallet host is an isolated process that owns embedded-wallet key
//! material. This crate speaks its JSON request/response protocol:
//! typed message parsing, a request correlator that multiplexes many
//! in-flight requests over one channel, the embedded-wallet session state
//! machine, and a WebSocket transport with reconnection.

pub mod client;
pub mod config;
pub mod connection;
pub mod correlator;
pub mod error;
pub mod events;
pub mod messages;
pub mod processor;
pub mod reconnect;
pub mod rpc;
pub mod session;
pub mod transport;

pub use config::HostConfig;
pub use correlator::{CorrelationError, Dispatch, RequestCorrelator};
pub use error::EmbeddedWalletError;
pub use events::HostEvent;
pub use rpc::{RpcRequest, RpcResponse};
pub use session::{HostState, WalletHost};
pub use transport::{ChannelTransport, Transport, TransportError};
