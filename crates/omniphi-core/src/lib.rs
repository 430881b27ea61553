// Omniphi chain primitives shared by the module crates.

pub mod error;
pub mod hash;
pub mod msg;
pub mod types;

pub use error::{CoreError, Result};
pub use hash::sha256;
pub use msg::{ChainMsg, RawMsg};
pub use types::{Address, Hash, ACCOUNT_HRP};
