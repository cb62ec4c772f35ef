//! Message envelope exchanged between ggnet peers.
//!
//! Only the data shape lives here. Connections, handshakes and framing
//! belong to the transport, which also decides what the `stream` flag on an
//! [`Rpc`] means for the bytes that follow it.

pub mod error;
pub mod message;

pub use error::{ProtocolError, ProtocolResult};
pub use message::{Rpc, RpcKind, INCOMING_MESSAGE, INCOMING_STREAM};
