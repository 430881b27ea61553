//! Governance timelock module for the Omniphi chain.
//!
//! Interposes a mandatory delay between a governance proposal passing its
//! vote and its messages executing. Passed proposals are intercepted at
//! end-of-block, queued as delayed operations, and the host proposal is
//! flipped to Failed so the host executor never runs it. A guardian account
//! may cancel queued operations or shorten their delay to the emergency
//! value; execution itself is permissionless once the delay elapses.
//!
//! # Block wiring
//!
//! The engine must invoke [`TimelockModule::end_block`] strictly before the
//! host governance module's end-of-block routine, and deliver
//! [`GovernanceHooks::after_proposal_voting_period_ended`] from the host's
//! tally transaction. All timing uses the engine-provided block time; the
//! module never reads a wall clock.

pub mod adapter;
pub mod driver;
pub mod error;
pub mod events;
pub mod genesis;
pub mod hooks;
pub mod module;
pub mod msg;
pub mod operation;
pub mod params;
pub mod query;
pub mod queue;
pub mod server;
pub mod store;

#[cfg(test)]
mod testutil;

pub use adapter::{
    AdapterError, BlockContext, DispatchError, GovProposal, GovProposalStatus, GovernanceAdapter,
    MsgDispatcher,
};
pub use error::{Result, TimelockError};
pub use events::TimelockEvent;
pub use genesis::GenesisState;
pub use hooks::GovernanceHooks;
pub use module::TimelockModule;
pub use msg::{
    MsgCancel, MsgEmergencyExecute, MsgExecute, MsgUpdateGuardian, MAX_REASON_LEN,
    MSG_UPDATE_GUARDIAN_TYPE_URL,
};
pub use operation::{content_hash, Operation, OperationStatus};
pub use params::TimelockParams;
pub use query::{PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use queue::{ExecuteOutcome, QueueMode};
pub use store::{TimelockStore, TIMELOCK_COLUMN_FAMILIES};
