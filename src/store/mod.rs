//! Persistence seam for cases, the stage catalog and audit rows
//!
//! Every engine operation runs inside [`CaseStore::transaction`]: the closure
//! sees a private working copy through [`StoreTx`], and its writes become
//! durable only if it returns `Ok`. An `Err` anywhere discards all of them,
//! so a history row can never exist without its status write.

mod dataset;
mod file;
mod memory;
mod tx;


use crate::errors::WorkflowResult;

pub use dataset::Dataset;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use tx::{StoreTx, MAX_COMMENT_LEN};

pub trait CaseStore {
    /// Run `f` as one all-or-nothing unit.
    fn transaction<T, F>(&self, f: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut StoreTx<'_>) -> WorkflowResult<T>;

    /// Consistent read-only copy of the whole dataset
    fn snapshot(&self) -> WorkflowResult<Dataset>;
}
