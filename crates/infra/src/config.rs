//! Service configuration.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (`--host`, `--port`)
//! 2. Environment (`DATABASE_URL`)
//! 3. The JSON configuration file
//!
//! The file keeps the key spelling of the service's existing deployments:
//!
//! ```json
//! {
//!   "DBContext": { "Shema": "users", "User": "postgres", "Password": "secret", "Host": "localhost", "Port": "5432" },
//!   "APIContext": { "Host": "0.0.0.0", "Port": "8080" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "./user-configuration.json";

/// Environment variable that replaces the DSN built from `DBContext`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "DBContext")]
    pub db_context: DbContext,
    #[serde(rename = "APIContext")]
    pub api_context: ApiContext,
}

/// Database connection settings. All values are strings, as in the file.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DbContext {
    /// Database name.
    #[serde(rename = "Shema")]
    pub schema: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for DbContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbContext")
            .field("schema", &self.schema)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Which `UserStore` backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ApiContext {
    pub host: String,
    pub port: String,
    pub storage: StorageKind,
}

impl Default for ApiContext {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: "8080".to_string(),
            storage: StorageKind::default(),
        }
    }
}

impl Configuration {
    /// Read and parse the JSON configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply CLI overrides; empty values are ignored.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<String>) -> Self {
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            self.api_context.host = host;
        }
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            self.api_context.port = port;
        }
        self
    }

    /// DSN to connect with: `DATABASE_URL` when set, otherwise built from `DBContext`.
    pub fn database_url(&self) -> String {
        self.database_url_with(std::env::var(DATABASE_URL_ENV).ok())
    }

    fn database_url_with(&self, env_url: Option<String>) -> String {
        env_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.db_context.database_url())
    }
}

impl DbContext {
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.user, self.password, self.host, self.port, self.schema
        )
    }
}

impl ApiContext {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
