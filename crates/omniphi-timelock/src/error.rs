use crate::operation::OperationStatus;
use omniphi_core::{Address, CoreError};
use omniphi_storage::StorageError;
use thiserror::Error;

/// Timelock-specific errors.
#[derive(Error, Debug)]
pub enum TimelockError {
    #[error("operation {0} not found")]
    OperationNotFound(u64),

    #[error("operation {0} already exists")]
    OperationExists(u64),

    #[error("proposal {proposal_id} already queued as operation {operation_id}")]
    DuplicateQueue { proposal_id: u64, operation_id: u64 },

    #[error("operation {id} is not queued (status: {status:?})")]
    InvalidState { id: u64, status: OperationStatus },

    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("operation {id} is not executable until {executable_at} (block time {now})")]
    NotYetExecutable { id: u64, executable_at: u64, now: u64 },

    #[error("operation {id} expired at {expires_at} (block time {now})")]
    Expired { id: u64, expires_at: u64, now: u64 },

    #[error("message {index} dispatch failed: {reason}")]
    DispatchFailed { index: usize, reason: String },

    /// Consensus-critical: a Passed proposal could not be neutralized in the
    /// host governance store. The block must fail rather than let the host
    /// executor run the proposal.
    #[error("host governance write failed for proposal {proposal_id}: {reason}")]
    HostGovWrite { proposal_id: u64, reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CoreError> for TimelockError {
    fn from(err: CoreError) -> Self {
        TimelockError::InvalidMessage(err.to_string())
    }
}

impl From<bincode::Error> for TimelockError {
    fn from(err: bincode::Error) -> Self {
        TimelockError::Storage(StorageError::from(err))
    }
}

pub type Result<T> = std::result::Result<T, TimelockError>;
