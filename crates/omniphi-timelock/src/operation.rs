use crate::error::{Result, TimelockError};
use omniphi_core::{sha256, Address, Hash, RawMsg};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a queued operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OperationStatus {
    /// Waiting for its delay to elapse.
    Queued,
    /// All messages dispatched successfully.
    Executed,
    /// Cancelled by the guardian or the governance authority.
    Cancelled,
    /// Execution window closed without an execute call.
    Expired,
    /// A message failed during dispatch; earlier messages remain applied.
    Failed,
}

impl OperationStatus {
    /// Terminal states accept no further mutation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Queued)
    }
}

/// A deferred, durable intent to dispatch one or more messages at a future
/// block time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub id: u64,
    /// Originating governance proposal; zero is reserved for ad-hoc queueing.
    pub proposal_id: u64,
    /// Message sequence preserved bit-for-bit from the proposal.
    pub messages: Vec<RawMsg>,
    /// Deterministic digest of the canonical message encoding.
    pub content_hash: Hash,
    pub queued_at_unix: u64,
    /// Earliest block time at which Execute is permitted (inclusive).
    pub executable_at_unix: u64,
    /// Latest block time at which Execute is permitted (inclusive).
    pub expires_at_unix: u64,
    pub status: OperationStatus,
    /// Cancel reason, or the guardian's justification after an emergency
    /// re-timing.
    pub cancel_reason: Option<String>,
    /// Set on transition to Executed, Expired, or Failed.
    pub executed_at_unix: Option<u64>,
    /// Authority that queued the operation.
    pub initiator: Address,
}

impl Operation {
    /// Both window bounds are inclusive.
    pub fn in_execution_window(&self, now: u64) -> bool {
        now >= self.executable_at_unix && now <= self.expires_at_unix
    }

    pub fn is_past_window(&self, now: u64) -> bool {
        now > self.expires_at_unix
    }
}

/// Digest of the canonical (bincode) encoding of a message sequence; stable
/// across replicas for a fixed message list.
pub fn content_hash(messages: &[RawMsg]) -> Result<Hash> {
    let encoded = bincode::serialize(messages)
        .map_err(|e| TimelockError::InvalidMessage(e.to_string()))?;
    Ok(sha256(&encoded))
}
