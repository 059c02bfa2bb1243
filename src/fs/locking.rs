//! Advisory locking and atomic replacement for the file-backed store
//!
//! A sidecar lock file serializes transactions across processes (CLI
//! invocations, embedding services). The data file itself is only ever
//! replaced by rename, so readers never observe a half-written document.
//!
//! Advisory locks are cooperative - all participants must use these functions
//! for the locking to be effective.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Held lock on a sidecar file; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn open_lock_file(path: &Path) -> Result<File> {
    #[allow(clippy::suspicious_open_options)]
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open lock file: {}", path.display()))
}

/// Acquire an exclusive lock, blocking while any other lock is held.
pub fn lock_exclusive(path: &Path) -> Result<LockGuard> {
    let file = open_lock_file(path)?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;
    Ok(LockGuard { file })
}

/// Acquire a shared lock, allowing concurrent readers.
pub fn lock_shared(path: &Path) -> Result<LockGuard> {
    let file = open_lock_file(path)?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    Ok(LockGuard { file })
}

/// Read a whole file as UTF-8. Returns `None` when it does not exist yet.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut content = String::new();
    BufReader::new(&file)
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(Some(content))
}

/// Replace `path` with `content` via a temp file in the same directory and
/// a rename.
///
/// The sequence is: create temp → write → flush → sync → rename over target.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staging = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    staging
        .write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    staging
        .flush()
        .with_context(|| format!("Failed to flush temp file for {}", path.display()))?;
    staging
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file for {}", path.display()))?;
    staging
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
