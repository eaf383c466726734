use crate::reference::AcceptedReference;
use crate::scm::ScmKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration surface consumed by one mining run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Filesystem path of the repository to mine
    pub path: PathBuf,
    /// Repository name used for the persisted record and scratch labels
    pub name: String,
    /// Version-control backend selector
    #[serde(default = "default_scm")]
    pub scm: ScmKind,
    /// Accepted (name, type) reference pairs; empty means mine nothing
    #[serde(default)]
    pub references: Vec<AcceptedReference>,
    /// Commit page size for the harvester
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Gates downstream file-level analysis
    #[serde(default)]
    pub process_files: bool,
}

fn default_scm() -> ScmKind {
    ScmKind::Git
}

fn default_page_size() -> usize {
    500
}

impl MinerConfig {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            scm: default_scm(),
            references: Vec::new(),
            page_size: default_page_size(),
            process_files: false,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.page_size == 0 {
            return Err(crate::Error::Config("page_size must be at least 1".into()));
        }
        if self.name.is_empty() {
            return Err(crate::Error::Config("repository name must not be empty".into()));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("repominer.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MinerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MinerConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &MinerConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
