use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use docmigrate::config::{CONFIG_DIR, CONFIG_FILE};
use docmigrate::{DocmigrateConfig, RedisStore};

/// Project context for docmigrate operations
pub struct ProjectContext {
    /// Root directory of the project (where Cargo.toml is)
    pub project_root: PathBuf,
    /// Path to .docmigrate directory
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    /// Loaded configuration, defaults when the file is absent
    pub config: DocmigrateConfig,
}

impl ProjectContext {
    /// Find and load project context from current directory or ancestors
    pub fn find() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::find_from(&current_dir)
    }

    pub fn find_from(start: &Path) -> Result<Self> {
        let project_root = Self::find_project_root(start)?;
        Self::from_root(project_root)
    }

    /// Create context from a known project root
    pub fn from_root(project_root: PathBuf) -> Result<Self> {
        let config_dir = project_root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            DocmigrateConfig::load(&config_path).context("Failed to load config.toml")?
        } else {
            DocmigrateConfig::default()
        };

        Ok(Self {
            project_root,
            config_dir,
            config_path,
            config,
        })
    }

    fn find_project_root(start: &Path) -> Result<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join("Cargo.toml").exists() {
                return Ok(current);
            }

            if !current.pop() {
                anyhow::bail!(
                    "Could not find Cargo.toml in {start:?} or any parent directory. \
                     Are you in a Rust project?"
                );
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.config_path.exists()
    }

    /// Ledger collection, preferring a command-line override
    pub fn collection(&self, override_name: Option<&str>) -> String {
        override_name
            .map(str::to_string)
            .unwrap_or_else(|| self.config.ledger.collection.clone())
    }

    pub async fn connect(&self) -> Result<RedisStore> {
        let redis_url = self.config.redis_url().context("REDIS_URL is required to reach the ledger")?;
        RedisStore::connect(&redis_url, self.config.ledger.namespace.clone())
            .await
            .context("Failed to connect to Redis")
    }
}
