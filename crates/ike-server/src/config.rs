//! Configuration for the ike-server HTTP service.

use ike_graph::DriverSettings;
use serde::Deserialize;

/// Top-level server configuration.
///
/// Loaded from the `[server]` section of `ike.toml` or
/// `IKE__SERVER__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Driver settings applied to every per-request connection.
    #[serde(default)]
    pub neo4j: DriverSettings,
}

/// Cross-origin policy for browser clients.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API. `"*"` allows any origin and
    /// turns credentialed requests off.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl ServerConfig {
    /// Load from `<file_prefix>.toml` (optional) and `IKE__` environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("IKE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins"),
            )
            .build()?;

        Self::from_config(&cfg)
    }

    /// Extract the `server` section, falling back to defaults when absent.
    pub fn from_config(cfg: &config::Config) -> Result<Self, config::ConfigError> {
        match cfg.get::<ServerConfig>("server") {
            Ok(c) => Ok(c),
            Err(config::ConfigError::NotFound(_)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://127.0.0.1:8000",
        "http://localhost",
        "http://localhost:8000",
        "http://localhost:8080",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
            log: LogConfig::default(),
            neo4j: DriverSettings::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: default_true(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
