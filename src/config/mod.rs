use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable consulted before the `--config` flag
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config path is not set; export CONFIG_PATH or pass --config")]
    PathNotSet,

    #[error("config file doesn't exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub storage_path: PathBuf,
    pub http_server: HttpServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "local" => Ok(Environment::Development),
            "stage" | "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    pub address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    /// Seconds to wait when acquiring a pooled connection
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub enable_cors: bool,
}

fn default_shutdown_timeout() -> u64 {
    5
}

/// On-disk layout. Optional sections fall back to the environment presets.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    env: Environment,
    storage_path: PathBuf,
    http_server: HttpServerConfig,
    database: Option<DatabaseConfig>,
    api: Option<ApiConfig>,
}

impl AppConfig {
    /// Resolve the config path (`CONFIG_PATH` first, then the CLI flag),
    /// read the YAML file and apply environment overrides.
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = env::var_os(CONFIG_PATH_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or(cli_path)
            .ok_or(ConfigError::PathNotSet)?;

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_yaml_str(&raw)?.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(raw)?;
        let preset = match file.env {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        Ok(Self {
            environment: file.env,
            storage_path: file.storage_path,
            http_server: file.http_server,
            database: file.database.unwrap_or(preset.0),
            api: file.api.unwrap_or(preset.1),
        })
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("ENV") {
            self.environment = v.parse().unwrap_or(self.environment);
        }
        if let Some(v) = lookup("STORAGE_PATH") {
            if !v.is_empty() {
                self.storage_path = PathBuf::from(v);
            }
        }
        if let Some(v) = lookup("HTTP_SERVER_ADDRESS") {
            if !v.is_empty() {
                self.http_server.address = v;
            }
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Some(v) = lookup("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }

        self
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }

    fn development() -> (DatabaseConfig, ApiConfig) {
        (
            DatabaseConfig {
                max_connections: 5,
                connection_timeout: 30,
            },
            ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                enable_cors: true,
            },
        )
    }

    fn staging() -> (DatabaseConfig, ApiConfig) {
        (
            DatabaseConfig {
                max_connections: 10,
                connection_timeout: 10,
            },
            ApiConfig {
                max_request_size_bytes: 1024 * 1024, // 1MB
                enable_cors: true,
            },
        )
    }

    fn production() -> (DatabaseConfig, ApiConfig) {
        (
            DatabaseConfig {
                max_connections: 10,
                connection_timeout: 5,
            },
            ApiConfig {
                max_request_size_bytes: 64 * 1024,
                enable_cors: false,
            },
        )
    }
}
