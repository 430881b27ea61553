use omniphi_core::{ChainMsg, RawMsg};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-block inputs from the block engine. The module reads no other clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    pub height: u64,
    pub time_unix: u64,
}

impl BlockContext {
    pub fn new(height: u64, time_unix: u64) -> Self {
        Self { height, time_unix }
    }
}

/// Host governance proposal statuses, as the host module defines them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GovProposalStatus {
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    Failed,
}

/// The slice of the host proposal the timelock needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovProposal {
    pub id: u64,
    pub status: GovProposalStatus,
    pub messages: Vec<RawMsg>,
}

#[derive(Error, Debug)]
#[error("host governance write failed: {0}")]
pub struct AdapterError(pub String);

/// Read + status-write facade over the host governance module's proposal
/// collection. Injected; the timelock never constructs the host module.
pub trait GovernanceAdapter: Send + Sync {
    fn get_proposal(&self, id: u64) -> Option<GovProposal>;
    fn set_proposal(&self, proposal: GovProposal) -> Result<(), AdapterError>;
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Routes a decoded message to its handler module. Injected by the chain
/// wiring; dispatch is atomic per message but not across messages.
pub trait MsgDispatcher: Send + Sync {
    fn dispatch(&self, msg: &ChainMsg) -> Result<(), DispatchError>;
}
