use crate::error::{Result, TimelockError};
use omniphi_core::{Address, ChainMsg};
use serde::{Deserialize, Serialize};

/// Routing key for the module's own guardian-rotation message. Operations
/// carrying it are applied by the timelock's execution path rather than
/// forwarded to the external dispatcher.
pub const MSG_UPDATE_GUARDIAN_TYPE_URL: &str = "/omniphi.timelock.v1.MsgUpdateGuardian";

/// Longest accepted cancel reason / emergency justification.
pub const MAX_REASON_LEN: usize = 512;

fn check_reason(field: &str, value: &str) -> Result<()> {
    if value.len() > MAX_REASON_LEN {
        return Err(TimelockError::InvalidMessage(format!(
            "{field} exceeds {MAX_REASON_LEN} bytes"
        )));
    }
    Ok(())
}

/// Execute a queued operation whose delay has elapsed. Permissionless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExecute {
    pub operation_id: u64,
}

impl MsgExecute {
    pub fn validate(&self) -> Result<()> {
        if self.operation_id == 0 {
            return Err(TimelockError::InvalidMessage("operation_id must be set".into()));
        }
        Ok(())
    }
}

/// Cancel a queued operation. Guardian or governance authority only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancel {
    pub operation_id: u64,
    pub reason: String,
}

impl MsgCancel {
    pub fn validate(&self) -> Result<()> {
        if self.operation_id == 0 {
            return Err(TimelockError::InvalidMessage("operation_id must be set".into()));
        }
        check_reason("reason", &self.reason)
    }
}

/// Shorten a queued operation's delay to the emergency value. Guardian only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEmergencyExecute {
    pub operation_id: u64,
    pub justification: String,
}

impl MsgEmergencyExecute {
    pub fn validate(&self) -> Result<()> {
        if self.operation_id == 0 {
            return Err(TimelockError::InvalidMessage("operation_id must be set".into()));
        }
        if self.justification.is_empty() {
            return Err(TimelockError::InvalidMessage("justification must not be empty".into()));
        }
        check_reason("justification", &self.justification)
    }
}

/// Install, rotate, or remove the guardian. The rotation itself travels
/// through the queue once a guardian exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateGuardian {
    /// bech32 governance-module authority.
    pub authority: String,
    /// bech32 guardian address; empty removes the guardian.
    pub new_guardian: String,
}

impl MsgUpdateGuardian {
    /// Bech32-check both addresses; returns the parsed pair.
    pub fn validate(&self) -> Result<(Address, Option<Address>)> {
        let authority = Address::from_bech32(&self.authority)
            .map_err(|e| TimelockError::InvalidMessage(e.to_string()))?;
        let new_guardian = if self.new_guardian.is_empty() {
            None
        } else {
            Some(
                Address::from_bech32(&self.new_guardian)
                    .map_err(|e| TimelockError::InvalidMessage(e.to_string()))?,
            )
        };
        Ok((authority, new_guardian))
    }

    pub fn to_chain_msg(&self) -> Result<ChainMsg> {
        let body = bincode::serialize(self)
            .map_err(|e| TimelockError::InvalidMessage(e.to_string()))?;
        Ok(ChainMsg::new(MSG_UPDATE_GUARDIAN_TYPE_URL, body))
    }

    pub fn from_chain_msg(msg: &ChainMsg) -> Result<Self> {
        if msg.type_url != MSG_UPDATE_GUARDIAN_TYPE_URL {
            return Err(TimelockError::InvalidMessage(format!(
                "unexpected type url {}",
                msg.type_url
            )));
        }
        bincode::deserialize(&msg.body).map_err(|e| TimelockError::InvalidMessage(e.to_string()))
    }
}
