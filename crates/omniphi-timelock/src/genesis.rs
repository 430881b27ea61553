use crate::error::{Result, TimelockError};
use crate::module::TimelockModule;
use crate::operation::Operation;
use crate::params::TimelockParams;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Module genesis state. Pending-proposal marks are deliberately absent:
/// they describe an in-flight block and are invalid across a chain restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: TimelockParams,
    pub next_op_id: u64,
    pub operations: Vec<Operation>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self { params: TimelockParams::default(), next_op_id: 1, operations: Vec::new() }
    }
}

impl GenesisState {
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        let mut ids = HashSet::new();
        let mut proposals = HashSet::new();
        for op in &self.operations {
            if op.id == 0 || op.id >= self.next_op_id {
                return Err(TimelockError::InvalidParams(format!(
                    "operation id {} outside counter range (next_op_id {})",
                    op.id, self.next_op_id
                )));
            }
            if !ids.insert(op.id) {
                return Err(TimelockError::OperationExists(op.id));
            }
            if op.proposal_id != 0 && !proposals.insert(op.proposal_id) {
                return Err(TimelockError::DuplicateQueue {
                    proposal_id: op.proposal_id,
                    operation_id: op.id,
                });
            }
            if op.expires_at_unix < op.executable_at_unix {
                return Err(TimelockError::InvalidParams(format!(
                    "operation {} expires before it becomes executable",
                    op.id
                )));
            }
        }
        Ok(())
    }
}

impl TimelockModule {
    /// Import genesis state. Any pending-proposal marks already in the
    /// database (e.g. from a restored snapshot) are dropped.
    pub fn init_genesis(&self, genesis: &GenesisState) -> Result<()> {
        genesis.validate()?;

        self.set_params(genesis.params.clone())?;
        for op in &genesis.operations {
            self.store.insert_operation(op)?;
        }
        self.store.set_next_op_id(genesis.next_op_id)?;

        for proposal_id in self.store.pending_proposals()? {
            warn!("dropping stale pending proposal #{} at genesis", proposal_id);
            self.store.unmark_pending(proposal_id)?;
        }
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState> {
        Ok(GenesisState {
            params: self.store.params()?,
            next_op_id: self.store.next_op_id()?,
            operations: self.store.all_operations()?,
        })
    }
}
