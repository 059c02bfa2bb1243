use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::errors::WorkflowResult;
use crate::fs::locking::{atomic_write, lock_exclusive, lock_shared, read_optional};

use super::dataset::Dataset;
use super::tx::StoreTx;
use super::CaseStore;

/// JSON-document store on disk.
///
/// Each transaction holds an exclusive lock on a sidecar `.lock` file from
/// read to commit, so concurrent CLI invocations are serialized. Commit
/// replaces the document atomically; a failed transaction never touches it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let lock_path = path.with_extension("lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<Dataset> {
        match read_optional(&self.path)? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse store file: {}", self.path.display())),
            None => Ok(Dataset::default()),
        }
    }

    fn write(&self, data: &Dataset) -> anyhow::Result<()> {
        let content =
            serde_json::to_string_pretty(data).context("Failed to serialize store to JSON")?;
        atomic_write(&self.path, &content)
    }
}

impl CaseStore for FileStore {
    fn transaction<T, F>(&self, f: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut StoreTx<'_>) -> WorkflowResult<T>,
    {
        let _guard = lock_exclusive(&self.lock_path)?;
        let mut working = self.read()?;
        let output = {
            let mut tx = StoreTx::new(&mut working);
            f(&mut tx)?
        };
        self.write(&working)?;
        Ok(output)
    }

    fn snapshot(&self) -> WorkflowResult<Dataset> {
        let _guard = lock_shared(&self.lock_path)?;
        Ok(self.read()?)
    }
}
