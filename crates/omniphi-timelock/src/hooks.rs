use crate::module::TimelockModule;
use tracing::{debug, warn};

/// Hooks the host governance module invokes on proposal lifecycle edges.
pub trait GovernanceHooks {
    /// Called when a proposal leaves its voting period. May be delivered
    /// more than once for the same proposal.
    fn after_proposal_voting_period_ended(&self, proposal_id: u64);
}

impl GovernanceHooks for TimelockModule {
    fn after_proposal_voting_period_ended(&self, proposal_id: u64) {
        // Must never fail the host transaction; status is still settling on
        // the host side, so no checks here beyond marking the set.
        match self.store.mark_pending(proposal_id) {
            Ok(()) => debug!("proposal #{} marked pending for interception", proposal_id),
            Err(e) => warn!("⚠️ Failed to mark proposal #{} pending: {}", proposal_id, e),
        }
    }
}
