//! Repository record
//!
//! Owned exclusively by the orchestrator for the duration of a run. The
//! contributor list is written in a second phase, after all references have
//! been processed.

use crate::commit::Contributor;
use crate::scm::ScmKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The repository being mined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Identity assigned by the store on first persistence
    pub id: Option<i64>,
    pub name: String,
    pub scm: ScmKind,
    /// Normalized filesystem path (forward slashes)
    pub path: String,
    /// Deduplicated contributors, populated by the second-phase update
    pub contributors: Vec<Contributor>,
}

impl Repository {
    pub fn new(name: impl Into<String>, scm: ScmKind, path: &Path) -> Self {
        Self {
            id: None,
            name: name.into(),
            scm,
            path: normalize_path(path),
            contributors: Vec::new(),
        }
    }
}

/// Normalize a filesystem path to an absolute, forward-slash form
pub fn normalize_path(path: &Path) -> String {
    let absolute = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf());
    absolute.to_string_lossy().replace('\\', "/")
}
