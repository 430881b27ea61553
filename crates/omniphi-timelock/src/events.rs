use omniphi_core::Address;
use serde::{Deserialize, Serialize};

/// Events surfaced to the block engine; drained once per block via
/// `TimelockModule::take_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockEvent {
    ProposalMarkedForTimelock {
        proposal_id: u64,
    },
    OperationQueued {
        id: u64,
        proposal_id: u64,
        executable_at_unix: u64,
        expires_at_unix: u64,
    },
    OperationExecuted {
        id: u64,
    },
    OperationFailed {
        id: u64,
        failing_message_index: usize,
        error: String,
    },
    OperationCancelled {
        id: u64,
        reason: String,
        by: Address,
    },
    OperationEmergencyExecuteSet {
        id: u64,
        new_executable_at_unix: u64,
        justification: String,
    },
    OperationExpired {
        id: u64,
    },
    GuardianUpdated {
        old: Option<Address>,
        new: Option<Address>,
    },
}
