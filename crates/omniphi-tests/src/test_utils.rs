// A miniature block engine around the timelock module: an in-memory host
// governance module (with its own end-of-block executor), a recording
// dispatcher, and block helpers that enforce the required module ordering.

use omniphi_core::{Address, ChainMsg, RawMsg};
use omniphi_storage::ModuleDB;
use omniphi_timelock::{
    AdapterError, BlockContext, DispatchError, GovProposal, GovProposalStatus, GovernanceAdapter,
    GovernanceHooks, MsgDispatcher, TimelockEvent, TimelockModule, TimelockParams, TimelockStore,
    TIMELOCK_COLUMN_FAMILIES,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Honors RUST_LOG when set; silent otherwise.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

/// Governance-module account, derived the way the chain wiring derives it.
pub fn gov_authority() -> Address {
    Address::from_module_name("gov")
}

pub fn guardian() -> Address {
    addr(0xB2)
}

/// One decodable single-byte message per marker.
pub fn raw_msgs(markers: &[u8]) -> Vec<RawMsg> {
    markers
        .iter()
        .map(|b| {
            ChainMsg::new("/omniphi.test.v1.MsgNoop", vec![*b])
                .encode()
                .unwrap()
        })
        .collect()
}

/// Host governance stand-in. Its `end_block` mimics the host executor: it
/// runs every proposal still marked Passed.
#[derive(Default)]
pub struct MockGovModule {
    proposals: RwLock<HashMap<u64, GovProposal>>,
    executed: RwLock<Vec<u64>>,
    fail_writes: RwLock<bool>,
}

impl MockGovModule {
    pub fn insert(&self, proposal: GovProposal) {
        self.proposals.write().insert(proposal.id, proposal);
    }

    pub fn get(&self, id: u64) -> Option<GovProposal> {
        self.proposals.read().get(&id).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.write() = fail;
    }

    /// Proposal ids the host executor ran (should stay empty under a
    /// correctly ordered engine).
    pub fn executed(&self) -> Vec<u64> {
        self.executed.read().clone()
    }

    /// Host end-of-block executor: dispatches every Passed proposal.
    pub fn end_block(&self) {
        let passed: Vec<u64> = self
            .proposals
            .read()
            .values()
            .filter(|p| p.status == GovProposalStatus::Passed)
            .map(|p| p.id)
            .collect();
        self.executed.write().extend(passed);
    }
}

impl GovernanceAdapter for MockGovModule {
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

    pub fn dispatched_markers(&self) -> Vec<u8> {
        self.dispatched.read().iter().filter_map(|m| m.body.first().copied()).collect()
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

pub struct TestChain {
    pub module: TimelockModule,
    pub gov: Arc<MockGovModule>,
    pub dispatcher: Arc<RecordingDispatcher>,
    _dir: TempDir,
}

impl TestChain {
    /// Fresh chain with the test guardian installed.
    pub fn new() -> Self {
        let chain = Self::without_guardian();
        let mut params = chain.module.params().unwrap();
        params.guardian = Some(guardian());
        chain.module.set_params(params).unwrap();
        chain
    }

    pub fn without_guardian() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        // the node opens one shared database and hands the module its families
        let db = ModuleDB::open(dir.path(), TIMELOCK_COLUMN_FAMILIES).unwrap();
        let store = TimelockStore::new(Arc::new(db));
        let gov = Arc::new(MockGovModule::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let module = TimelockModule::new(store, gov.clone(), dispatcher.clone(), gov_authority());
        TestChain { module, gov, dispatcher, _dir: dir }
    }

    pub fn params(&self) -> TimelockParams {
        self.module.params().unwrap()
    }

    /// A proposal passes its vote: store it and fire the vote-end hook.
    pub fn pass_proposal(&self, id: u64, markers: &[u8]) {
        self.pass_proposal_raw(id, raw_msgs(markers));
    }

    pub fn pass_proposal_raw(&self, id: u64, messages: Vec<RawMsg>) {
        self.gov.insert(GovProposal { id, status: GovProposalStatus::Passed, messages });
        self.module.after_proposal_voting_period_ended(id);
    }

    /// End-of-block in the engine's required order: timelock first, host
    /// governance second. Returns the timelock events of the block.
    pub fn end_block(&self, height: u64, time_unix: u64) -> Vec<TimelockEvent> {
        self.module
            .end_block(&BlockContext::new(height, time_unix))
            .expect("timelock end_block failed");
        self.gov.end_block();
        assert!(
            self.gov.executed().is_empty(),
            "host executor ran proposals the timelock should have intercepted: {:?}",
            self.gov.executed()
        );
        self.module.take_events()
    }

    pub fn ctx(&self, height: u64, time_unix: u64) -> BlockContext {
        BlockContext::new(height, time_unix)
    }
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}
