//! Persistence layer
//!
//! SQLite-backed gateway for mined entities. The two-phase ordering is
//! deliberate: parent records are inserted first to obtain their ids, commit
//! batches follow, and the repository's contributor list is written once at
//! the very end as an update.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
