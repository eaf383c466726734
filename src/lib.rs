//! # Repominer - Repository History Miner
//!
//! Mines the history of a version-controlled repository into a queryable store.
//!
//! Repominer provides:
//! - Reference enumeration and selection (branches/tags against an accepted set)
//! - Paginated commit harvesting with cross-reference deduplication
//! - Issue-tracker identifier extraction from commit messages
//! - Contributor aggregation with set semantics
//! - SQLite-backed persistence with two-phase entity ordering
//! - Pluggable version-control backends behind a session trait

pub mod repository;
pub mod reference;
pub mod commit;
pub mod issue;
pub mod scm;
pub mod storage;
pub mod scratch;
pub mod miner;
pub mod config;

// Re-exports for convenient access
pub use repository::Repository;
pub use reference::{Reference, ReferenceType};
pub use commit::{Commit, Contributor};
pub use issue::{IssueExtractor, IssueReference};
pub use storage::SqliteStore;
pub use miner::{Miner, MiningReport};

/// Result type alias for Repominer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Repominer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Scratch copy or session open failed; nothing was persisted yet.
    #[error("Resource acquisition failed: {0}")]
    ResourceAcquisition(String),

    /// The version-control adapter failed mid-traversal. Batches already
    /// persisted stay valid; remaining pages for the reference are abandoned.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Unreadable text encoding in an artifact during downstream analysis.
    /// Non-fatal; scoped to the affected artifact.
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
