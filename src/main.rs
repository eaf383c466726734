//! Repominer CLI - Command-line interface for the repository history miner

use clap::{Parser, Subcommand};
use repominer::config::{self, MinerConfig};
use repominer::reference::AcceptedReference;
use repominer::scm;
use repominer::storage::SqliteStore;
use repominer::{Miner, ReferenceType};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "repominer")]
#[command(version = "0.1.0")]
#[command(about = "Repository history miner - reference-aware commit harvesting")]
#[command(long_about = r#"
Repominer harvests the commit history of selected branches and tags into a
SQLite store, extracting issue-tracker references from commit messages and
aggregating the repository's contributors. Commits reachable from several
references are persisted once.

Example usage:
  repominer mine --path ./myrepo --branch main --branch develop
  repominer refs --path ./myrepo
  repominer stats --database repominer.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine a repository's history into the store
    Mine {
        /// Path to the repository to mine
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Path to the database file
        #[arg(short, long, default_value = "repominer.db")]
        database: PathBuf,

        /// Repository name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Branch to mine (repeatable)
        #[arg(short, long)]
        branch: Vec<String>,

        /// Tag to mine (repeatable)
        #[arg(short, long)]
        tag: Vec<String>,

        /// Commit page size
        #[arg(long, default_value = "500")]
        page_size: usize,

        /// Enable downstream file-level analysis
        #[arg(long)]
        process_files: bool,

        /// Read the run configuration from a TOML file instead of flags
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the references of a repository
    Refs {
        /// Path to the repository
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Show statistics about the mined data
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "repominer.db")]
        database: PathBuf,
    },

    /// Write a starter configuration file
    Init {
        /// Path to the repository to mine
        #[arg(short, long)]
        path: PathBuf,

        /// Repository name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Mine { path, database, name, branch, tag, page_size, process_files, config } => {
            let miner_config = if let Some(config_path) = config {
                config::load_config(Some(&config_path))?
                    .ok_or_else(|| anyhow::anyhow!("no config at {}", config_path.display()))?
            } else {
                let path = path
                    .ok_or_else(|| anyhow::anyhow!("either --path or --config is required"))?;
                let name = name.unwrap_or_else(|| directory_name(&path));

                let mut references: Vec<AcceptedReference> = branch
                    .into_iter()
                    .map(|b| AcceptedReference::new(b, ReferenceType::Branch))
                    .collect();
                references.extend(
                    tag.into_iter().map(|t| AcceptedReference::new(t, ReferenceType::Tag)),
                );

                let mut cfg = MinerConfig::new(path, name);
                cfg.references = references;
                cfg.page_size = page_size;
                cfg.process_files = process_files;
                cfg
            };

            println!("🚀 Mining repository: {}", miner_config.name);
            println!("📂 Path: {:?}", miner_config.path);
            println!("🗄️  Database: {:?}", database);
            if miner_config.references.is_empty() {
                println!("⚠️  No references configured; nothing will be harvested.");
            }

            let mut store = SqliteStore::open(&database)?;
            let report = Miner::new(miner_config).mine(&mut store)?;

            println!("\n📊 Mining complete:");
            println!("   References processed: {}", report.references_processed);
            println!("   Commits persisted: {}", report.commits_persisted);
            println!("   Contributors: {}", report.contributors);
            if report.analysis_ran {
                println!("   Analysis: ran");
            }
            for warning in &report.warnings {
                println!("   ⚠️  {}", warning);
            }

            let stats = store.stats()?;
            println!("{}", stats);
        }

        Commands::Refs { path } => {
            let mut session = scm::open_session(scm::ScmKind::Git, &path)?;
            let refs = session.references()?;

            if refs.is_empty() {
                println!("∅ No references found.");
            } else {
                for r in &refs {
                    println!("- [{}] {} ({})", r.ref_type, r.name, r.path);
                }
            }
            session.close()?;
        }

        Commands::Stats { database } => {
            let store = SqliteStore::open(&database)?;
            let stats = store.stats()?;

            println!("📊 Repominer Statistics ({:?})", database);
            println!("------------------------------------");
            println!("{}", stats);
        }

        Commands::Init { path, name, force } => {
            let name = name.unwrap_or_else(|| directory_name(&path));
            let mut cfg = MinerConfig::new(path, name);
            cfg.references.push(AcceptedReference::new("main", ReferenceType::Branch));

            let config_path = config::default_config_path();
            config::write_config(&config_path, &cfg, force)?;
            println!("✅ Wrote {}", config_path.display());
        }
    }

    Ok(())
}

fn directory_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
