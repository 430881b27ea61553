// Shared test fixtures: an in-memory host governance module and a recording
// message dispatcher wired around a real RocksDB-backed store.

use crate::adapter::{AdapterError, DispatchError, GovProposal, GovernanceAdapter, MsgDispatcher};
use crate::module::TimelockModule;
use crate::store::TimelockStore;
use omniphi_core::{Address, ChainMsg, RawMsg};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

pub fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

/// Governance-module authority used by every harness.
pub fn authority() -> Address {
    addr(0xA1)
}

/// Guardian installed by `test_module`.
pub fn guardian() -> Address {
    addr(0xB2)
}

/// One decodable single-byte message per entry; the byte doubles as a marker
/// the dispatcher can fail on.
pub fn raw_msgs(bytes: &[u8]) -> Vec<RawMsg> {
    bytes
        .iter()
        .map(|b| {
            ChainMsg::new("/omniphi.test.v1.MsgNoop", vec![*b])
                .encode()
                .unwrap()
        })
        .collect()
}

#[derive(Default)]
pub struct MockGov {
    proposals: RwLock<HashMap<u64, GovProposal>>,
    fail_writes: RwLock<bool>,
}

impl MockGov {
    pub fn insert(&self, proposal: GovProposal) {
        self.proposals.write().insert(proposal.id, proposal);
    }

    pub fn get(&self, id: u64) -> Option<GovProposal> {
        self.proposals.read().get(&id).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write() = fail;
    }
}

impl GovernanceAdapter for MockGov {
    fn get_proposal(&self, id: u64) -> Option<GovProposal> {
        self.proposals.read().get(&id).cloned()
    }

    fn set_proposal(&self, proposal: GovProposal) -> Result<(), AdapterError> {
        if *self.fail_writes.read() {
            return Err(AdapterError("write refused".into()));
        }
        self.proposals.write().insert(proposal.id, proposal);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    dispatched: RwLock<Vec<ChainMsg>>,
    fail_body: RwLock<Option<u8>>,
}

impl RecordingDispatcher {
    pub fn dispatched(&self) -> Vec<ChainMsg> {
        self.dispatched.read().clone()
    }

    /// Fail any message whose first body byte equals `marker`.
    pub fn fail_on_body(&self, marker: u8) {
        *self.fail_body.write() = Some(marker);
    }
}

impl MsgDispatcher for RecordingDispatcher {
    fn dispatch(&self, msg: &ChainMsg) -> Result<(), DispatchError> {
        if let (Some(marker), Some(first)) = (*self.fail_body.read(), msg.body.first()) {
            if marker == *first {
                return Err(DispatchError("handler rejected message".into()));
            }
        }
        self.dispatched.write().push(msg.clone());
        Ok(())
    }
}

pub struct Harness {
    pub module: TimelockModule,
    pub gov: Arc<MockGov>,
    pub dispatcher: Arc<RecordingDispatcher>,
    _dir: TempDir,
}

/// Module over a fresh temp database, with the test guardian installed.
pub fn test_module() -> Harness {
    let harness = test_module_without_guardian();
    let mut params = harness.module.params().unwrap();
    params.guardian = Some(guardian());
    harness.module.set_params(params).unwrap();
    harness
}

/// Module over a fresh temp database, default params (no guardian).
pub fn test_module_without_guardian() -> Harness {
    let dir = TempDir::new().unwrap();
    let store = TimelockStore::open(dir.path()).unwrap();
    let gov = Arc::new(MockGov::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let module = TimelockModule::new(store, gov.clone(), dispatcher.clone(), authority());
    Harness { module, gov, dispatcher, _dir: dir }
}
