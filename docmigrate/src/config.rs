//! Project configuration stored in `.docmigrate/config.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{MigrateError, MigrateResult};
use crate::ledger::DEFAULT_MIGRATIONS_COLLECTION;

pub const CONFIG_DIR: &str = ".docmigrate";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_NAMESPACE: &str = "docmigrate";
pub const DEFAULT_REDIS_URL: &str = "${REDIS_URL}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocmigrateConfig {
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub redis: RedisSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Collection holding the version history
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Key prefix shared by every collection and index
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            namespace: default_namespace(),
        }
    }
}

fn default_collection() -> String {
    DEFAULT_MIGRATIONS_COLLECTION.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}

impl DocmigrateConfig {
    /// Read and parse a config file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> MigrateResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| MigrateError::Config {
            message: format!("failed to read {}: {err}", path.display()),
        })?;
        Self::from_toml(&content).map_err(|err| MigrateError::Config {
            message: format!("failed to parse {}: {err}", path.display()),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> MigrateResult<String> {
        toml::to_string_pretty(self).map_err(|err| MigrateError::Config {
            message: format!("failed to serialize config: {err}"),
        })
    }

    /// Redis URL with a whole-value `${VAR}` reference expanded from the environment.
    pub fn redis_url(&self) -> MigrateResult<String> {
        expand_env(&self.redis.url)
    }
}

fn expand_env(value: &str) -> MigrateResult<String> {
    match value.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(var_name) => std::env::var(var_name).map_err(|_| MigrateError::Config {
            message: format!("environment variable {var_name} not set"),
        }),
        None => Ok(value.to_string()),
    }
}
