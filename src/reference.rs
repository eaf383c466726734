//! Reference types and selection
//!
//! A reference is a named pointer into repository history (branch or tag).
//! Selection filters the references discovered by the version-control
//! adapter against the accepted set from configuration, preserving
//! discovery order.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of a repository reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    /// A movable head (e.g. `refs/heads/main`)
    Branch,
    /// An immutable label (e.g. `refs/tags/v1.0`)
    Tag,
}

impl ReferenceType {
    /// Get the string representation of the reference type
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Branch => "branch",
            ReferenceType::Tag => "tag",
        }
    }
}

impl FromStr for ReferenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "branch" | "head" => Ok(ReferenceType::Branch),
            "tag" => Ok(ReferenceType::Tag),
            _ => Err(Error::Config(format!("Unknown reference type: {}", s))),
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (name, type) pair from configuration naming a reference to mine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedReference {
    /// Short reference name (e.g. `main`, `v1.0`)
    pub name: String,
    /// Branch or tag
    #[serde(rename = "type")]
    pub ref_type: ReferenceType,
}

impl AcceptedReference {
    pub fn new(name: impl Into<String>, ref_type: ReferenceType) -> Self {
        Self { name: name.into(), ref_type }
    }
}

/// A reference as reported by the version-control adapter.
///
/// `commit_ids` holds the unfiltered full-history snapshot. It is captured
/// once, persisted with the reference record, and cleared afterwards; it is
/// not live state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// Identity assigned by the store on persistence
    pub id: Option<i64>,
    /// Owning repository id, set by the orchestrator before persistence
    pub repository_id: Option<i64>,
    /// Short name (e.g. `main`)
    pub name: String,
    /// Full path within the backend (e.g. `refs/heads/main`)
    pub path: String,
    /// Branch or tag
    pub ref_type: ReferenceType,
    /// Unfiltered commit-id snapshot, tip first
    pub commit_ids: Vec<String>,
}

impl Reference {
    /// Create a reference as discovered by the adapter (no identity yet)
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        ref_type: ReferenceType,
    ) -> Self {
        Self {
            id: None,
            repository_id: None,
            name: name.into(),
            path: path.into(),
            ref_type,
            commit_ids: Vec::new(),
        }
    }

    /// Whether this reference matches an accepted (name, type) pair
    pub fn matches(&self, accepted: &AcceptedReference) -> bool {
        self.name == accepted.name && self.ref_type == accepted.ref_type
    }
}

/// Filter discovered references against the accepted set.
///
/// Returns the subsequence whose (name, type) pair is in `accepted`,
/// preserving discovery order. An empty accepted set yields an empty
/// selection; that is not an error.
pub fn select(discovered: &[Reference], accepted: &[AcceptedReference]) -> Vec<Reference> {
    discovered
        .iter()
        .filter(|r| accepted.iter().any(|a| r.matches(a)))
        .cloned()
        .collect()
}
