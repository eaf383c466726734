//! Database schema definitions

/// SQL to create the repositories table
pub const CREATE_REPOSITORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS repositories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    scm TEXT NOT NULL,
    path TEXT NOT NULL,
    contributors TEXT NOT NULL DEFAULT '[]'
)
"#;

/// SQL to create the refs table
/// `commit_ids` holds the unfiltered snapshot captured at persistence time
pub const CREATE_REFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repository_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    ref_type TEXT NOT NULL,
    commit_ids TEXT NOT NULL
)
"#;

/// SQL to create the commits table
/// Keyed per repository; dedup within one run is the harvester's job, and
/// re-mining or forks may legitimately repeat a hash across repository rows
pub const CREATE_COMMITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS commits (
    id TEXT NOT NULL,
    repository_id INTEGER NOT NULL,
    message TEXT NOT NULL,
    committer_name TEXT NOT NULL,
    committer_email TEXT NOT NULL,
    author_name TEXT NOT NULL,
    author_email TEXT NOT NULL,
    time INTEGER NOT NULL,
    issues TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (repository_id, id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_refs_repository ON refs(repository_id)",
    "CREATE INDEX IF NOT EXISTS idx_commits_repository ON commits(repository_id)",
    "CREATE INDEX IF NOT EXISTS idx_commits_committer ON commits(committer_email)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_REPOSITORIES_TABLE,
        CREATE_REFS_TABLE,
        CREATE_COMMITS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
