// External message handlers. The block engine routes signed transactions
// here; `signer` is the verified transaction signer.

use crate::adapter::BlockContext;
use crate::error::{Result, TimelockError};
use crate::module::TimelockModule;
use crate::msg::{MsgCancel, MsgEmergencyExecute, MsgExecute, MsgUpdateGuardian};
use crate::operation::Operation;
use crate::queue::ExecuteOutcome;
use omniphi_core::Address;

impl TimelockModule {
    /// `MsgExecute` — permissionless. A dispatch failure is recorded on the
    /// operation and returned in the outcome; the transaction itself
    /// succeeds so the caller's fees are consumed and the state transition
    /// sticks.
    pub fn handle_execute(&self, ctx: &BlockContext, msg: MsgExecute) -> Result<ExecuteOutcome> {
        msg.validate()?;
        self.execute_operation(ctx, msg.operation_id)
    }

    /// `MsgCancel` — guardian or governance authority.
    pub fn handle_cancel(&self, msg: MsgCancel, signer: Address) -> Result<()> {
        msg.validate()?;
        self.cancel_operation(msg.operation_id, msg.reason, signer)
    }

    /// `MsgEmergencyExecute` — guardian only.
    pub fn handle_emergency_execute(
        &self,
        ctx: &BlockContext,
        msg: MsgEmergencyExecute,
        signer: Address,
    ) -> Result<Operation> {
        msg.validate()?;
        self.emergency_execute(ctx, msg.operation_id, msg.justification, signer)
    }

    /// Direct `MsgUpdateGuardian` transaction. Installing the first guardian
    /// is open to the governance authority; once a guardian exists the
    /// rotation must travel through the queue (the module's own execution
    /// path applies it), so direct calls are rejected.
    pub fn handle_update_guardian(&self, msg: MsgUpdateGuardian, signer: Address) -> Result<()> {
        let (msg_authority, new_guardian) = msg.validate()?;
        if signer != self.authority || msg_authority != self.authority {
            return Err(TimelockError::Unauthorized(signer));
        }
        if self.store.params()?.guardian.is_some() {
            return Err(TimelockError::Unauthorized(signer));
        }
        self.set_guardian(new_guardian)
    }
}
