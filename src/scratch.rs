//! Scratch filesystem copies
//!
//! Mining never runs against the caller's checkout: the orchestrator works on
//! a scratch copy under the system temp directory. The copy is a guard value;
//! dropping it removes the directory, which covers every exit path including
//! propagated errors.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A scratch copy of a repository, removed on drop
#[derive(Debug)]
pub struct ScratchCopy {
    path: PathBuf,
}

impl ScratchCopy {
    /// Copy `source` into a fresh directory under the system temp dir.
    ///
    /// A half-finished copy is removed before the error propagates, so a
    /// failed acquisition never leaks a scratch directory.
    pub fn create(source: &Path, label: &str) -> Result<Self> {
        if !source.is_dir() {
            return Err(Error::ResourceAcquisition(format!(
                "not a directory: {}",
                source.display()
            )));
        }

        let unique = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir_name = format!(
            "repominer-{}-{}-{}",
            sanitize(label),
            std::process::id(),
            unique
        );
        let dest = std::env::temp_dir().join(dir_name);

        let scratch = Self { path: dest };
        if let Err(e) = copy_tree(source, &scratch.path) {
            // Drop removes whatever was copied before the failure
            return Err(match e {
                e @ Error::ResourceAcquisition(_) => e,
                other => Error::ResourceAcquisition(other.to_string()),
            });
        }

        tracing::debug!("scratch copy at {}", scratch.path.display());
        Ok(scratch)
    }

    /// The scratch root
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchCopy {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                tracing::warn!("failed to remove scratch {}: {}", self.path.display(), e);
            }
        }
    }
}

fn sanitize(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            Error::ResourceAcquisition(format!("scratch copy failed: {}", e))
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)?;
        } else {
            tracing::debug!("skipping non-regular file {}", entry.path().display());
        }
    }
    Ok(())
}
