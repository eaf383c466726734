//! SQLite storage implementation

use super::schema;
use crate::commit::{Commit, Contributor};
use crate::reference::Reference;
use crate::repository::Repository;
use crate::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed store for mined repositories, references and commits
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Repository Operations ==========

    /// Insert a repository record and return its assigned id.
    ///
    /// Contributors are not written here; they arrive via
    /// [`update_contributors`](Self::update_contributors) once the run is done.
    pub fn insert_repository(&self, repository: &Repository) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO repositories (name, scm, path) VALUES (?1, ?2, ?3)",
            params![repository.name, repository.scm.as_str(), repository.path],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace the repository's contributor list in a single update
    pub fn update_contributors(
        &self,
        repository_id: i64,
        contributors: &[Contributor],
    ) -> Result<()> {
        let json = serde_json::to_string(contributors)?;
        let updated = self.conn.execute(
            "UPDATE repositories SET contributors = ?1 WHERE id = ?2",
            params![json, repository_id],
        )?;
        if updated == 0 {
            return Err(Error::Config(format!(
                "no repository with id {}",
                repository_id
            )));
        }
        Ok(())
    }

    /// Read back the stored contributor list
    pub fn contributors(&self, repository_id: i64) -> Result<Vec<Contributor>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT contributors FROM repositories WHERE id = ?1",
                [repository_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Count all repositories
    pub fn count_repositories(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM repositories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Reference Operations ==========

    /// Insert a reference record (with its commit-id snapshot) and return
    /// its assigned id. The owning repository id must already be set.
    pub fn insert_reference(&self, reference: &Reference) -> Result<i64> {
        let repository_id = reference
            .repository_id
            .ok_or_else(|| Error::Config("reference has no repository id".into()))?;
        let snapshot = serde_json::to_string(&reference.commit_ids)?;

        self.conn.execute(
            "INSERT INTO refs (repository_id, name, path, ref_type, commit_ids)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                repository_id,
                reference.name,
                reference.path,
                reference.ref_type.as_str(),
                snapshot,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Read back a reference's persisted commit-id snapshot
    pub fn reference_snapshot(&self, reference_id: i64) -> Result<Vec<String>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT commit_ids FROM refs WHERE id = ?1",
                [reference_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Count all references
    pub fn count_references(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM refs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Commit Operations ==========

    /// Persist one harvested batch as a single write.
    ///
    /// Plain INSERT: the harvester's visited set guarantees an id arrives at
    /// most once per run, so a duplicate is a bug worth surfacing.
    pub fn insert_commits(&mut self, commits: &[Commit]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO commits
                 (id, repository_id, message, committer_name, committer_email,
                  author_name, author_email, time, issues)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for commit in commits {
                let issues = serde_json::to_string(&commit.issues)?;
                stmt.execute(params![
                    commit.id,
                    commit.repository_id,
                    commit.message,
                    commit.committer.name,
                    commit.committer.email,
                    commit.author.name,
                    commit.author.email,
                    commit.time,
                    issues,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All persisted commit ids for a repository, in persistence order
    pub fn commit_ids(&self, repository_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM commits WHERE repository_id = ?1 ORDER BY rowid",
        )?;
        let ids = stmt
            .query_map([repository_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(ids)
    }

    /// Read back the issue references stored for one commit of a repository
    pub fn commit_issues(
        &self,
        repository_id: i64,
        commit_id: &str,
    ) -> Result<Vec<crate::issue::IssueReference>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT issues FROM commits WHERE repository_id = ?1 AND id = ?2",
                params![repository_id, commit_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Count all commits
    pub fn count_commits(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            repositories: self.count_repositories()?,
            references: self.count_references()?,
            commits: self.count_commits()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub repositories: usize,
    pub references: usize,
    pub commits: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Repositories: {}", self.repositories)?;
        writeln!(f, "  References: {}", self.references)?;
        writeln!(f, "  Commits: {}", self.commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueReference;
    use crate::reference::ReferenceType;
    use crate::scm::ScmKind;

    fn sample_repository(store: &SqliteStore) -> i64 {
        let repo = Repository {
            id: None,
            name: "demo".into(),
            scm: ScmKind::Git,
            path: "/tmp/demo".into(),
            contributors: Vec::new(),
        };
        store.insert_repository(&repo).unwrap()
    }

    fn sample_commit(id: &str, repository_id: i64) -> Commit {
        let mut commit = Commit::new(
            id,
            format!("commit {}", id),
            Contributor::new("Alice", "alice@example.com"),
            Contributor::new("Alice", "alice@example.com"),
            1_700_000_000,
        );
        commit.repository_id = Some(repository_id);
        commit
    }

    #[test]
    fn test_repository_insert_assigns_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = sample_repository(&store);
        assert!(id > 0);
        assert_eq!(store.count_repositories().unwrap(), 1);
    }

    #[test]
    fn test_contributors_written_as_update() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = sample_repository(&store);

        assert!(store.contributors(id).unwrap().is_empty());

        let contributors = vec![
            Contributor::new("Alice", "alice@example.com"),
            Contributor::new("Bob", "bob@example.com"),
        ];
        store.update_contributors(id, &contributors).unwrap();

        assert_eq!(store.contributors(id).unwrap(), contributors);
        // Still one repository row: contributors are an update, not an insert
        assert_eq!(store.count_repositories().unwrap(), 1);
    }

    #[test]
    fn test_update_contributors_unknown_repository() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.update_contributors(99, &[]).is_err());
    }

    #[test]
    fn test_reference_snapshot_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let repo_id = sample_repository(&store);

        let mut reference = Reference::new("main", "refs/heads/main", ReferenceType::Branch);
        reference.repository_id = Some(repo_id);
        reference.commit_ids = vec!["c2".into(), "c1".into()];

        let ref_id = store.insert_reference(&reference).unwrap();
        assert_eq!(
            store.reference_snapshot(ref_id).unwrap(),
            vec!["c2".to_string(), "c1".to_string()]
        );
    }

    #[test]
    fn test_reference_requires_repository_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let reference = Reference::new("main", "refs/heads/main", ReferenceType::Branch);
        assert!(store.insert_reference(&reference).is_err());
    }

    #[test]
    fn test_commit_batch_roundtrip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let repo_id = sample_repository(&store);

        let mut first = sample_commit("c1", repo_id);
        first.issues = vec![IssueReference { id: "PROJ-42".into(), kind: "ticket-key".into() }];
        let batch = vec![first, sample_commit("c2", repo_id)];

        store.insert_commits(&batch).unwrap();

        assert_eq!(store.commit_ids(repo_id).unwrap(), vec!["c1", "c2"]);
        let issues = store.commit_issues(repo_id, "c1").unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, "PROJ-42");
    }

    #[test]
    fn test_duplicate_commit_id_is_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let repo_id = sample_repository(&store);

        store.insert_commits(&[sample_commit("c1", repo_id)]).unwrap();
        let err = store.insert_commits(&[sample_commit("c1", repo_id)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_same_commit_hash_across_repositories() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = sample_repository(&store);
        let second = sample_repository(&store);

        // Re-mining the same repository (or a fork) repeats hashes; the key
        // is scoped per repository row, so both writes land.
        store.insert_commits(&[sample_commit("c1", first)]).unwrap();
        store.insert_commits(&[sample_commit("c1", second)]).unwrap();

        assert_eq!(store.commit_ids(first).unwrap(), vec!["c1"]);
        assert_eq!(store.commit_ids(second).unwrap(), vec!["c1"]);
        assert_eq!(store.count_commits().unwrap(), 2);
    }

    #[test]
    fn test_failed_batch_rolls_back_whole_write() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let repo_id = sample_repository(&store);
        store.insert_commits(&[sample_commit("c1", repo_id)]).unwrap();

        // Second batch contains a duplicate; the batch is one write, so the
        // fresh commit in it must not survive either.
        let batch = vec![sample_commit("c2", repo_id), sample_commit("c1", repo_id)];
        assert!(store.insert_commits(&batch).is_err());
        assert_eq!(store.commit_ids(repo_id).unwrap(), vec!["c1"]);
    }

    #[test]
    fn test_stats() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let repo_id = sample_repository(&store);
        store.insert_commits(&[sample_commit("c1", repo_id)]).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.repositories, 1);
        assert_eq!(stats.references, 0);
        assert_eq!(stats.commits, 1);
    }
}
