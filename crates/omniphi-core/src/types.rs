use crate::error::CoreError;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 32-byte hash type
pub type Hash = [u8; 32];

/// Bech32 human-readable prefix for Omniphi account addresses.
pub const ACCOUNT_HRP: &str = "omni";

/// 20-byte account address, rendered as `omni1…` bech32 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, CoreError> {
        if slice.len() != 20 {
            return Err(CoreError::InvalidAddress(format!(
                "expected 20 bytes, got {}",
                slice.len()
            )));
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Deterministic module-account address: first 20 bytes of the sha256 of
    /// the module name. Matches how chain-owned accounts are derived.
    pub fn from_module_name(name: &str) -> Self {
        let digest = crate::hash::sha256(name.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Parse an `omni1…` bech32 string, checking prefix and payload length.
    pub fn from_bech32(s: &str) -> Result<Self, CoreError> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        if hrp.as_str() != ACCOUNT_HRP {
            return Err(CoreError::InvalidAddress(format!(
                "wrong prefix: expected {ACCOUNT_HRP}, got {}",
                hrp.as_str()
            )));
        }
        Self::from_slice(&data)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hrp = Hrp::parse(ACCOUNT_HRP).map_err(|_| fmt::Error)?;
        let encoded = bech32::encode::<Bech32>(hrp, &self.0).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}
