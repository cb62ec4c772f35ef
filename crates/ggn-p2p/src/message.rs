use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Leading byte announcing a complete inline message.
pub const INCOMING_MESSAGE: u8 = 0x1;
/// Leading byte announcing that a raw stream transfer follows.
pub const INCOMING_STREAM: u8 = 0x2;

/// What an [`Rpc`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcKind {
    /// `payload` is the whole message.
    Message,
    /// A separate stream transfer follows; `payload` is empty.
    Stream,
}

impl RpcKind {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Message => INCOMING_MESSAGE,
            Self::Stream => INCOMING_STREAM,
        }
    }

    pub fn from_tag(tag: u8) -> ProtocolResult<Self> {
        match tag {
            INCOMING_MESSAGE => Ok(Self::Message),
            INCOMING_STREAM => Ok(Self::Stream),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::Stream => "Stream",
        }
    }
}

/// Data received from, or sent to, another peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rpc {
    /// Identifier of the sending peer.
    pub from: String,
    /// Application-defined bytes.
    pub payload: Vec<u8>,
    /// Set when a stream transfer follows instead of an inline message.
    pub stream: bool,
}

impl Rpc {
    /// Inline message from `from`.
    pub fn message(from: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            from: from.into(),
            payload,
            stream: false,
        }
    }

    /// Notice that `from` is about to send a stream.
    pub fn stream_notice(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            payload: Vec::new(),
            stream: true,
        }
    }

    pub fn kind(&self) -> RpcKind {
        if self.stream {
            RpcKind::Stream
        } else {
            RpcKind::Message
        }
    }

    pub fn type_tag(&self) -> u8 {
        self.kind().tag()
    }

    /// Encode the envelope body (no framing).
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    /// Decode an envelope body produced by [`encode`](Self::encode).
    pub fn decode(data: &[u8]) -> ProtocolResult<Self> {
        bincode::deserialize(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))
    }
}
