use crate::adapter::BlockContext;
use crate::error::{Result, TimelockError};
use crate::module::TimelockModule;
use crate::operation::{Operation, OperationStatus};
use crate::params::TimelockParams;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Offset/limit pagination; limit 0 selects the default page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { offset: 0, limit: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    fn bounds(&self) -> (usize, usize) {
        let limit = match self.limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        (self.offset as usize, limit as usize)
    }

    fn apply(&self, items: Vec<Operation>) -> Vec<Operation> {
        let (offset, limit) = self.bounds();
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl TimelockModule {
    pub fn query_params(&self) -> Result<TimelockParams> {
        self.store.params()
    }

    pub fn query_operation(&self, id: u64) -> Result<Operation> {
        self.store
            .get_operation(id)?
            .ok_or(TimelockError::OperationNotFound(id))
    }

    /// Queued operations ordered by id.
    pub fn query_queued(&self, page: PageRequest) -> Result<Vec<Operation>> {
        let queued = self
            .store
            .all_operations()?
            .into_iter()
            .filter(|op| op.status == OperationStatus::Queued)
            .collect();
        Ok(page.apply(queued))
    }

    /// Queued operations inside their execution window at the current block
    /// time, ordered by `(executable_at, id)`.
    pub fn query_executable(&self, ctx: &BlockContext, page: PageRequest) -> Result<Vec<Operation>> {
        let now = ctx.time_unix;
        let mut executable = Vec::new();
        for id in self.store.operations_by_executable_range(0, now)? {
            let Some(op) = self.store.get_operation(id)? else { continue };
            if op.status == OperationStatus::Queued && op.in_execution_window(now) {
                executable.push(op);
            }
        }
        Ok(page.apply(executable))
    }
}
