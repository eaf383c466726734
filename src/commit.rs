//! Commit and contributor models
//!
//! A commit is transient: built per harvested item, enriched with issue
//! references, persisted as part of a batch, then discarded. It is never
//! rebuilt once its id has entered the run's visited set.

use crate::issue::IssueReference;
use serde::{Deserialize, Serialize};

/// A contributor identity with set semantics.
///
/// Equal identities collapse to one entry regardless of how many commits
/// they authored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    pub email: String,
}

impl Contributor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }
}

impl std::fmt::Display for Contributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A commit as harvested from a reference's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Intrinsic identity (the backend's commit hash)
    pub id: String,
    /// Owning repository id, set by the harvester before persistence
    pub repository_id: Option<i64>,
    /// Full commit message
    pub message: String,
    /// The identity that committed the change
    pub committer: Contributor,
    /// The identity that authored the change
    pub author: Contributor,
    /// Commit time as unix seconds
    pub time: i64,
    /// Issue-tracker identifiers extracted from the message
    pub issues: Vec<IssueReference>,
}

impl Commit {
    /// Create a commit with no issue references attached yet
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        committer: Contributor,
        author: Contributor,
        time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            repository_id: None,
            message: message.into(),
            committer,
            author,
            time,
            issues: Vec::new(),
        }
    }

    /// Abbreviated id for log lines
    pub fn short_id(&self) -> &str {
        let end = self.id.len().min(7);
        &self.id[..end]
    }
}
