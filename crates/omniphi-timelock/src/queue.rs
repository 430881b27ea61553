// Queue manager: operation creation, execution, cancellation, and the
// guardian's emergency re-timing. All timing arithmetic uses block time.

use crate::adapter::BlockContext;
use crate::error::{Result, TimelockError};
use crate::events::TimelockEvent;
use crate::module::TimelockModule;
use crate::msg::{MsgUpdateGuardian, MSG_UPDATE_GUARDIAN_TYPE_URL};
use crate::operation::{content_hash, Operation, OperationStatus};
use omniphi_core::{Address, ChainMsg, RawMsg};
use tracing::{info, warn};

/// Delay class applied at queue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    Normal,
    Emergency,
}

/// Outcome of a successful Execute transaction. Dispatch failure is recorded
/// on the operation and reported here, not raised as a transaction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Completed,
    DispatchFailed { failing_message_index: usize, error: String },
}

impl TimelockModule {
    /// Create a Queued operation for a proposal's message sequence. Each
    /// proposal queues at most once.
    pub fn queue_operation(
        &self,
        ctx: &BlockContext,
        proposal_id: u64,
        messages: Vec<RawMsg>,
        initiator: Address,
        mode: QueueMode,
    ) -> Result<Operation> {
        if proposal_id != 0 {
            if let Some(operation_id) = self.store.operation_by_proposal(proposal_id)? {
                return Err(TimelockError::DuplicateQueue { proposal_id, operation_id });
            }
        }

        let params = self.store.params()?;
        let delay = match mode {
            QueueMode::Normal => params.min_delay_seconds,
            QueueMode::Emergency => params.emergency_delay_seconds,
        };

        let id = self.store.next_op_id()?;
        let content_hash = content_hash(&messages)?;
        let executable_at_unix = ctx.time_unix.saturating_add(delay);
        let expires_at_unix = executable_at_unix.saturating_add(params.grace_period_seconds);

        let op = Operation {
            id,
            proposal_id,
            messages,
            content_hash,
            queued_at_unix: ctx.time_unix,
            executable_at_unix,
            expires_at_unix,
            status: OperationStatus::Queued,
            cancel_reason: None,
            executed_at_unix: None,
            initiator,
        };
        self.store.insert_operation(&op)?;

        info!(
            "⏳ Queued operation #{} for proposal #{} (executable at {}, hash {})",
            id,
            proposal_id,
            executable_at_unix,
            hex::encode(&content_hash[..8]),
        );
        self.emit(TimelockEvent::OperationQueued {
            id,
            proposal_id,
            executable_at_unix,
            expires_at_unix,
        });
        Ok(op)
    }

    /// Execute a queued operation inside its window. Permissionless: the
    /// authority gate already happened at queue time.
    pub fn execute_operation(&self, ctx: &BlockContext, id: u64) -> Result<ExecuteOutcome> {
        let mut op = self
            .store
            .get_operation(id)?
            .ok_or(TimelockError::OperationNotFound(id))?;

        let now = ctx.time_unix;
        if op.status == OperationStatus::Expired {
            return Err(TimelockError::Expired { id, expires_at: op.expires_at_unix, now });
        }
        if op.status != OperationStatus::Queued {
            return Err(TimelockError::InvalidState { id, status: op.status });
        }

        if now < op.executable_at_unix {
            return Err(TimelockError::NotYetExecutable {
                id,
                executable_at: op.executable_at_unix,
                now,
            });
        }
        if op.is_past_window(now) {
            let expires_at = op.expires_at_unix;
            let old_executable_at = op.executable_at_unix;
            op.status = OperationStatus::Expired;
            op.executed_at_unix = Some(now);
            self.store.update_operation(old_executable_at, &op)?;
            self.emit(TimelockEvent::OperationExpired { id });
            return Err(TimelockError::Expired { id, expires_at, now });
        }

        // Sequential dispatch: the first failure stops the rest; earlier
        // messages remain applied.
        let mut failure: Option<(usize, String)> = None;
        for (index, raw) in op.messages.iter().enumerate() {
            let result = match ChainMsg::decode(raw) {
                Ok(msg) => self.dispatch_message(&msg),
                Err(e) => Err(e.to_string()),
            };
            if let Err(error) = result {
                failure = Some((index, error));
                break;
            }
        }

        let old_executable_at = op.executable_at_unix;
        op.executed_at_unix = Some(now);
        match failure {
            None => {
                op.status = OperationStatus::Executed;
                self.store.update_operation(old_executable_at, &op)?;
                info!("✅ Operation #{} executed ({} messages)", id, op.messages.len());
                self.emit(TimelockEvent::OperationExecuted { id });
                Ok(ExecuteOutcome::Completed)
            }
            Some((failing_message_index, error)) => {
                op.status = OperationStatus::Failed;
                self.store.update_operation(old_executable_at, &op)?;
                warn!(
                    "❌ Operation #{} failed at message {}: {}",
                    id, failing_message_index, error
                );
                self.emit(TimelockEvent::OperationFailed {
                    id,
                    failing_message_index,
                    error: error.clone(),
                });
                Ok(ExecuteOutcome::DispatchFailed { failing_message_index, error })
            }
        }
    }

    /// The module handles its own guardian rotation; everything else goes to
    /// the injected dispatcher.
    fn dispatch_message(&self, msg: &ChainMsg) -> std::result::Result<(), String> {
        if msg.type_url == MSG_UPDATE_GUARDIAN_TYPE_URL {
            self.apply_update_guardian(msg).map_err(|e| e.to_string())
        } else {
            self.dispatcher.dispatch(msg).map_err(|e| e.to_string())
        }
    }

    fn apply_update_guardian(&self, msg: &ChainMsg) -> Result<()> {
        let update = MsgUpdateGuardian::from_chain_msg(msg)?;
        let (authority, new_guardian) = update.validate()?;
        if authority != self.authority {
            return Err(TimelockError::Unauthorized(authority));
        }
        self.set_guardian(new_guardian)
    }

    /// Cancel a queued operation. Guardian or governance authority only.
    pub fn cancel_operation(&self, id: u64, reason: String, caller: Address) -> Result<()> {
        let params = self.store.params()?;
        if caller != self.authority && params.guardian != Some(caller) {
            return Err(TimelockError::Unauthorized(caller));
        }

        let mut op = self
            .store
            .get_operation(id)?
            .ok_or(TimelockError::OperationNotFound(id))?;
        if op.status != OperationStatus::Queued {
            return Err(TimelockError::InvalidState { id, status: op.status });
        }

        let old_executable_at = op.executable_at_unix;
        op.status = OperationStatus::Cancelled;
        op.cancel_reason = Some(reason.clone());
        self.store.update_operation(old_executable_at, &op)?;

        info!("🚫 Operation #{} cancelled by {}: {}", id, caller, reason);
        self.emit(TimelockEvent::OperationCancelled { id, reason, by: caller });
        Ok(())
    }

    /// Shorten a queued operation's delay to the emergency value. Guardian
    /// only. A delay already at or below the emergency value keeps its
    /// timing; the justification is recorded either way.
    pub fn emergency_execute(
        &self,
        ctx: &BlockContext,
        id: u64,
        justification: String,
        caller: Address,
    ) -> Result<Operation> {
        let params = self.store.params()?;
        if params.guardian != Some(caller) {
            return Err(TimelockError::Unauthorized(caller));
        }

        let mut op = self
            .store
            .get_operation(id)?
            .ok_or(TimelockError::OperationNotFound(id))?;
        if op.status != OperationStatus::Queued {
            return Err(TimelockError::InvalidState { id, status: op.status });
        }

        let old_executable_at = op.executable_at_unix;
        let fast_track = ctx.time_unix.saturating_add(params.emergency_delay_seconds);
        if fast_track < op.executable_at_unix {
            op.executable_at_unix = fast_track;
            op.expires_at_unix = fast_track.saturating_add(params.grace_period_seconds);
        }
        op.cancel_reason = Some(justification.clone());
        self.store.update_operation(old_executable_at, &op)?;

        info!(
            "🚨 Emergency execute set on operation #{} (executable at {}): {}",
            id, op.executable_at_unix, justification
        );
        self.emit(TimelockEvent::OperationEmergencyExecuteSet {
            id,
            new_executable_at_unix: op.executable_at_unix,
            justification,
        });
        Ok(op)
    }
}
