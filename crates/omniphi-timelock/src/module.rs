use crate::adapter::{GovernanceAdapter, MsgDispatcher};
use crate::error::Result;
use crate::events::TimelockEvent;
use crate::params::TimelockParams;
use crate::store::TimelockStore;
use omniphi_core::Address;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Governance timelock module.
///
/// Runs entirely under the block engine's single-threaded execution model;
/// the event buffer lock exists only because the module is shared behind
/// `Arc` between the tx path and the end-of-block path.
pub struct TimelockModule {
    pub(crate) store: TimelockStore,
    pub(crate) gov: Arc<dyn GovernanceAdapter>,
    pub(crate) dispatcher: Arc<dyn MsgDispatcher>,
    /// Governance-module account; the only authority that queues operations.
    pub(crate) authority: Address,
    events: RwLock<Vec<TimelockEvent>>,
}

impl TimelockModule {
    pub fn new(
        store: TimelockStore,
        gov: Arc<dyn GovernanceAdapter>,
        dispatcher: Arc<dyn MsgDispatcher>,
        authority: Address,
    ) -> Self {
        Self { store, gov, dispatcher, authority, events: RwLock::new(Vec::new()) }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn params(&self) -> Result<TimelockParams> {
        self.store.params()
    }

    /// Validated params write; used by genesis import.
    pub fn set_params(&self, params: TimelockParams) -> Result<()> {
        params.validate()?;
        self.store.set_params(&params)
    }

    pub fn guardian(&self) -> Result<Option<Address>> {
        Ok(self.store.params()?.guardian)
    }

    /// Install or remove the guardian and emit `GuardianUpdated`. Authority
    /// checks happen in the callers (message server / execution dispatch).
    pub(crate) fn set_guardian(&self, new: Option<Address>) -> Result<()> {
        let mut params = self.store.params()?;
        let old = params.guardian;
        params.guardian = new;
        params.validate()?;
        self.store.set_params(&params)?;
        match new {
            Some(addr) => info!("🛡️ Guardian updated to {}", addr),
            None => info!("🛡️ Guardian removed"),
        }
        self.emit(TimelockEvent::GuardianUpdated { old, new });
        Ok(())
    }

    pub(crate) fn emit(&self, event: TimelockEvent) {
        self.events.write().push(event);
    }

    /// Drain the per-block event buffer.
    pub fn take_events(&self) -> Vec<TimelockEvent> {
        std::mem::take(&mut *self.events.write())
    }
}
