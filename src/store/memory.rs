use anyhow::anyhow;
use std::sync::Mutex;

use crate::errors::WorkflowResult;

use super::dataset::Dataset;
use super::tx::StoreTx;
use super::CaseStore;

/// In-process store. Transactions are serialized by a mutex and run
/// against a clone of the dataset that replaces the original only on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Dataset>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(data: Dataset) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

impl CaseStore for MemoryStore {
    fn transaction<T, F>(&self, f: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut StoreTx<'_>) -> WorkflowResult<T>,
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        let mut working = guard.clone();
        let output = {
            let mut tx = StoreTx::new(&mut working);
            f(&mut tx)?
        };
        *guard = working;
        Ok(output)
    }

    fn snapshot(&self) -> WorkflowResult<Dataset> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        Ok(guard.clone())
    }
}
