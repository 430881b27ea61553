// End-of-block interception driver.
//
// The block engine must run `end_block` strictly BEFORE the host governance
// module's own end-of-block routine: the driver flips intercepted proposals
// to Failed so the host executor finds nothing to run. A misordered engine
// is a deployment defect the module cannot detect at runtime.

use crate::adapter::{BlockContext, GovProposal, GovProposalStatus};
use crate::error::{Result, TimelockError};
use crate::events::TimelockEvent;
use crate::module::TimelockModule;
use crate::operation::OperationStatus;
use crate::queue::QueueMode;
use omniphi_core::{ChainMsg, RawMsg};
use omniphi_storage::StorageError;
use tracing::{debug, info, warn};

impl TimelockModule {
    /// Drain the pending-proposal set, then sweep expired operations.
    ///
    /// Per-proposal conditions (missing, not passed, duplicate, undecodable)
    /// are logged and skipped; storage failures and host status-write
    /// failures abort the block.
    pub fn end_block(&self, ctx: &BlockContext) -> Result<()> {
        self.intercept_pending(ctx)?;
        self.sweep_expired(ctx)?;
        Ok(())
    }

    fn intercept_pending(&self, ctx: &BlockContext) -> Result<()> {
        // Ascending proposal id: iteration order is consensus-visible.
        for proposal_id in self.store.pending_proposals()? {
            let Some(proposal) = self.gov.get_proposal(proposal_id) else {
                warn!("proposal #{} missing from host governance, dropping", proposal_id);
                self.store.unmark_pending(proposal_id)?;
                continue;
            };

            if proposal.status != GovProposalStatus::Passed {
                debug!(
                    "proposal #{} finished as {:?}, not intercepting",
                    proposal_id, proposal.status
                );
                self.store.unmark_pending(proposal_id)?;
                continue;
            }

            // Duplicate hook delivery across blocks lands here.
            if self.store.operation_by_proposal(proposal_id)?.is_some() {
                debug!("proposal #{} already queued, dropping duplicate mark", proposal_id);
                self.store.unmark_pending(proposal_id)?;
                continue;
            }

            if let Err(e) = decodable(&proposal.messages) {
                warn!("🛑 Proposal #{} carries undecodable messages: {}", proposal_id, e);
                self.neutralize(proposal)?;
                self.store.unmark_pending(proposal_id)?;
                continue;
            }

            let op = self.queue_operation(
                ctx,
                proposal_id,
                proposal.messages.clone(),
                self.authority,
                QueueMode::Normal,
            )?;
            self.neutralize(proposal)?;
            self.store.unmark_pending(proposal_id)?;
            self.emit(TimelockEvent::ProposalMarkedForTimelock { proposal_id });
            info!(
                "⏳ Intercepted proposal #{} as operation #{} at block #{}",
                proposal_id, op.id, ctx.height
            );
        }
        Ok(())
    }

    /// Flip the host proposal to Failed so the host executor skips it. A
    /// write failure is consensus-critical: an un-neutralized Passed
    /// proposal would execute twice.
    fn neutralize(&self, mut proposal: GovProposal) -> Result<()> {
        let proposal_id = proposal.id;
        proposal.status = GovProposalStatus::Failed;
        self.gov
            .set_proposal(proposal)
            .map_err(|e| TimelockError::HostGovWrite { proposal_id, reason: e.to_string() })
    }

    fn sweep_expired(&self, ctx: &BlockContext) -> Result<()> {
        let now = ctx.time_unix;
        // Only live entries are in the time index, and an expired operation
        // always has executable_at < now, so [0, now] covers the sweep.
        for id in self.store.operations_by_executable_range(0, now)? {
            let Some(mut op) = self.store.get_operation(id)? else {
                return Err(TimelockError::Storage(StorageError::CorruptEntry(format!(
                    "time index references missing operation {id}"
                ))));
            };
            if op.status != OperationStatus::Queued || !op.is_past_window(now) {
                continue;
            }
            let old_executable_at = op.executable_at_unix;
            op.status = OperationStatus::Expired;
            op.executed_at_unix = Some(now);
            self.store.update_operation(old_executable_at, &op)?;
            info!("⌛ Operation #{} expired unexecuted", id);
            self.emit(TimelockEvent::OperationExpired { id });
        }
        Ok(())
    }
}

fn decodable(messages: &[RawMsg]) -> Result<()> {
    for (index, raw) in messages.iter().enumerate() {
        ChainMsg::decode(raw)
            .map_err(|e| TimelockError::InvalidMessage(format!("message {index}: {e}")))?;
    }
    Ok(())
}
