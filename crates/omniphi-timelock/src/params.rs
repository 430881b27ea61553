use crate::error::{Result, TimelockError};
use omniphi_core::Address;
use serde::{Deserialize, Serialize};

/// Tuneable timelock parameters.
///
/// `max_delay_seconds` bounds what a future queue path may request; the
/// interception driver itself always queues at `min_delay_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockParams {
    /// Delay applied to normally queued operations.  Default: 86_400 (24 h).
    pub min_delay_seconds: u64,
    /// Upper bound on any queue delay.  Default: 1_209_600 (14 d).
    pub max_delay_seconds: u64,
    /// Execution window after the delay elapses.  Default: 604_800 (7 d).
    pub grace_period_seconds: u64,
    /// Reduced delay available to the guardian.  Default: 3_600 (1 h).
    pub emergency_delay_seconds: u64,
    /// Guardian account.  `None` means no guardian is installed.
    pub guardian: Option<Address>,
}

impl Default for TimelockParams {
    fn default() -> Self {
        Self {
            min_delay_seconds: 86_400,        // 24 h
            max_delay_seconds: 1_209_600,     // 14 d
            grace_period_seconds: 604_800,    // 7 d
            emergency_delay_seconds: 3_600,   // 1 h
            guardian: None,
        }
    }
}

impl TimelockParams {
    pub fn validate(&self) -> Result<()> {
        if self.emergency_delay_seconds > self.min_delay_seconds {
            return Err(TimelockError::InvalidParams(format!(
                "emergency delay {} exceeds min delay {}",
                self.emergency_delay_seconds, self.min_delay_seconds
            )));
        }
        if self.min_delay_seconds > self.max_delay_seconds {
            return Err(TimelockError::InvalidParams(format!(
                "min delay {} exceeds max delay {}",
                self.min_delay_seconds, self.max_delay_seconds
            )));
        }
        if self.grace_period_seconds < self.emergency_delay_seconds {
            return Err(TimelockError::InvalidParams(format!(
                "grace period {} is shorter than emergency delay {}",
                self.grace_period_seconds, self.emergency_delay_seconds
            )));
        }
        Ok(())
    }
}
