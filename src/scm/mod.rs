//! Version-control adapter framework
//!
//! The mining core never talks to a backend directly: it consumes the
//! [`ScmSession`] trait, and backends are chosen by a factory keyed on the
//! configured [`ScmKind`].

pub mod git;

pub use git::GitSession;

use crate::commit::Commit;
use crate::reference::{Reference, ReferenceType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

/// Supported version-control backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    Git,
}

impl ScmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScmKind::Git => "git",
        }
    }
}

impl FromStr for ScmKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "git" => Ok(ScmKind::Git),
            _ => Err(Error::Config(format!("Unknown scm kind: {}", s))),
        }
    }
}

impl std::fmt::Display for ScmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An open session against a version-controlled repository.
///
/// Sessions are exclusively owned by one mining run: acquired at the start,
/// closed unconditionally at the end. All calls are blocking; callers that
/// need timeouts must wrap them externally.
pub trait ScmSession {
    /// All references (branches and tags) of the repository, in the
    /// backend's discovery order.
    fn references(&self) -> Result<Vec<Reference>>;

    /// The full, unfiltered commit-id snapshot of one reference, in
    /// traversal order. Used for the persisted reference record.
    fn reference_commit_ids(&self, ref_path: &str, ref_type: ReferenceType)
        -> Result<Vec<String>>;

    /// Up to `max_count` commits of `reference` at raw-traversal offset
    /// `skip`, excluding any id in `visited`, in traversal order.
    fn fetch_commits(
        &self,
        skip: usize,
        max_count: usize,
        reference: &Reference,
        visited: &HashSet<String>,
    ) -> Result<Vec<Commit>>;

    /// Release the session. Must be safe to call exactly once on every
    /// exit path.
    fn close(&mut self) -> Result<()>;
}

/// Open a session for the configured backend kind
pub fn open_session(kind: ScmKind, path: &Path) -> Result<Box<dyn ScmSession>> {
    match kind {
        ScmKind::Git => Ok(Box::new(GitSession::open(path)?)),
    }
}
