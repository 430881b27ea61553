use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Opaque serialized message, preserved bit-for-bit from the proposal that
/// carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMsg(pub Vec<u8>);

impl RawMsg {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decoded wire form of a chain message: a routing key plus the
/// handler-specific payload. This is the value the message dispatcher routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMsg {
    pub type_url: String,
    pub body: Vec<u8>,
}

impl ChainMsg {
    pub fn new(type_url: impl Into<String>, body: Vec<u8>) -> Self {
        Self { type_url: type_url.into(), body }
    }

    pub fn decode(raw: &RawMsg) -> Result<Self> {
        bincode::deserialize(&raw.0).map_err(|e| CoreError::MsgDecode(e.to_string()))
    }

    pub fn encode(&self) -> Result<RawMsg> {
        bincode::serialize(self)
            .map(RawMsg)
            .map_err(|e| CoreError::MsgEncode(e.to_string()))
    }
}
