// Durable timelock state over the module database.
//
// Key layout:
//   timelock_params / "params"                  -> TimelockParams
//   operations / <id be>                        -> Operation
//   operations_by_time / <exec be><id be>       -> <id be>
//   operations_by_proposal / <proposal id be>   -> <id be>
//   pending_proposals / <proposal id be>        -> [1]
//   timelock_meta / "next_op_id"                -> <u64 be>
//
// Big-endian keys make RocksDB iteration order equal numeric order, which
// the driver relies on for deterministic pending-set draining.

use crate::error::Result;
use crate::operation::{Operation, OperationStatus};
use crate::params::TimelockParams;
use omniphi_storage::{ModuleDB, StorageError};
use std::path::Path;
use std::sync::Arc;

const CF_PARAMS: &str = "timelock_params";
const CF_OPERATIONS: &str = "operations";
const CF_OPS_BY_TIME: &str = "operations_by_time";
const CF_OPS_BY_PROPOSAL: &str = "operations_by_proposal";
const CF_PENDING: &str = "pending_proposals";
const CF_META: &str = "timelock_meta";

/// Column families the module needs; passed to `ModuleDB::open`.
pub const TIMELOCK_COLUMN_FAMILIES: &[&str] = &[
    CF_PARAMS,
    CF_OPERATIONS,
    CF_OPS_BY_TIME,
    CF_OPS_BY_PROPOSAL,
    CF_PENDING,
    CF_META,
];

const KEY_PARAMS: &[u8] = b"params";
const KEY_NEXT_OP_ID: &[u8] = b"next_op_id";

fn time_key(executable_at: u64, id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&executable_at.to_be_bytes());
    key[8..].copy_from_slice(&id.to_be_bytes());
    key
}

fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StorageError::CorruptEntry(format!("expected u64 key, got {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

/// Typed accessors for the timelock column families.
pub struct TimelockStore {
    db: Arc<ModuleDB>,
}

impl TimelockStore {
    pub fn new(db: Arc<ModuleDB>) -> Self {
        Self { db }
    }

    /// Open a standalone database holding only the timelock families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = ModuleDB::open(path, TIMELOCK_COLUMN_FAMILIES)?;
        Ok(Self::new(Arc::new(db)))
    }

    // ─── Params ──────────────────────────────────────────────────────

    /// Current params; defaults when the store is unset (genesis).
    pub fn params(&self) -> Result<TimelockParams> {
        match self.db.get(CF_PARAMS, KEY_PARAMS)? {
            Some(bytes) => {
                let params = bincode::deserialize(&bytes)?;
                Ok(params)
            }
            None => Ok(TimelockParams::default()),
        }
    }

    pub fn set_params(&self, params: &TimelockParams) -> Result<()> {
        let bytes = bincode::serialize(params)?;
        self.db.put(CF_PARAMS, KEY_PARAMS, &bytes)?;
        Ok(())
    }

    // ─── Operations ──────────────────────────────────────────────────

    /// The id the next queued operation will take.
    pub fn next_op_id(&self) -> Result<u64> {
        match self.db.get(CF_META, KEY_NEXT_OP_ID)? {
            Some(bytes) => decode_u64(&bytes),
            None => Ok(1),
        }
    }

    pub fn set_next_op_id(&self, next: u64) -> Result<()> {
        self.db.put(CF_META, KEY_NEXT_OP_ID, &next.to_be_bytes())?;
        Ok(())
    }

    /// Persist a new operation: record, both secondary indexes, and the id
    /// counter land in one atomic batch. The time index is only populated
    /// for live (Queued) operations.
    pub fn insert_operation(&self, op: &Operation) -> Result<()> {
        let id_be = op.id.to_be_bytes();
        let bytes = bincode::serialize(op)?;

        let mut batch = self.db.batch();
        batch.put(CF_OPERATIONS, &id_be, &bytes)?;
        if op.status == OperationStatus::Queued {
            batch.put(CF_OPS_BY_TIME, &time_key(op.executable_at_unix, op.id), &id_be)?;
        }
        if op.proposal_id != 0 {
            batch.put(CF_OPS_BY_PROPOSAL, &op.proposal_id.to_be_bytes(), &id_be)?;
        }
        let next = op.id.saturating_add(1).max(self.next_op_id()?);
        batch.put(CF_META, KEY_NEXT_OP_ID, &next.to_be_bytes())?;
        batch.commit()?;
        Ok(())
    }

    /// Rewrite an operation after a state or timing transition.
    /// `old_executable_at` locates the stale time-index entry; the entry is
    /// re-created only while the operation stays Queued.
    pub fn update_operation(&self, old_executable_at: u64, op: &Operation) -> Result<()> {
        let id_be = op.id.to_be_bytes();
        let bytes = bincode::serialize(op)?;

        let mut batch = self.db.batch();
        batch.put(CF_OPERATIONS, &id_be, &bytes)?;
        batch.delete(CF_OPS_BY_TIME, &time_key(old_executable_at, op.id))?;
        if op.status == OperationStatus::Queued {
            batch.put(CF_OPS_BY_TIME, &time_key(op.executable_at_unix, op.id), &id_be)?;
        }
        batch.commit()?;
        Ok(())
    }

    pub fn get_operation(&self, id: u64) -> Result<Option<Operation>> {
        match self.db.get(CF_OPERATIONS, &id.to_be_bytes())? {
            Some(bytes) => {
                let op = bincode::deserialize(&bytes)?;
                Ok(Some(op))
            }
            None => Ok(None),
        }
    }

    pub fn has_operation(&self, id: u64) -> Result<bool> {
        Ok(self.db.has(CF_OPERATIONS, &id.to_be_bytes())?)
    }

    /// Operation id queued for a proposal, if any.
    pub fn operation_by_proposal(&self, proposal_id: u64) -> Result<Option<u64>> {
        match self.db.get(CF_OPS_BY_PROPOSAL, &proposal_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode_u64(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Ids of live operations with `from <= executable_at <= to`, ordered by
    /// `(executable_at, id)`.
    pub fn operations_by_executable_range(&self, from: u64, to: u64) -> Result<Vec<u64>> {
        let entries = self
            .db
            .scan_range(CF_OPS_BY_TIME, &time_key(from, 0), &time_key(to, u64::MAX))?;
        entries.iter().map(|(_, v)| decode_u64(v)).collect()
    }

    /// Every stored operation, ascending by id.
    pub fn all_operations(&self) -> Result<Vec<Operation>> {
        self.db
            .scan_all(CF_OPERATIONS)?
            .iter()
            .map(|(_, bytes)| {
                let op = bincode::deserialize(bytes).map_err(StorageError::from)?;
                Ok(op)
            })
            .collect()
    }

    // ─── Pending-proposal set ────────────────────────────────────────

    /// Idempotent: re-marking an already pending proposal is a no-op.
    pub fn mark_pending(&self, proposal_id: u64) -> Result<()> {
        self.db.put(CF_PENDING, &proposal_id.to_be_bytes(), &[1])?;
        Ok(())
    }

    pub fn unmark_pending(&self, proposal_id: u64) -> Result<()> {
        self.db.delete(CF_PENDING, &proposal_id.to_be_bytes())?;
        Ok(())
    }

    pub fn is_pending(&self, proposal_id: u64) -> Result<bool> {
        Ok(self.db.has(CF_PENDING, &proposal_id.to_be_bytes())?)
    }

    /// Pending proposal ids in ascending order (deterministic drain order).
    pub fn pending_proposals(&self) -> Result<Vec<u64>> {
        self.db
            .scan_all(CF_PENDING)?
            .iter()
            .map(|(k, _)| decode_u64(k))
            .collect()
    }
}
