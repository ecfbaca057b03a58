//! Configuration loading and typed config structures for the `agora` binary.
//!
//! The canonical configuration lives in `agora-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides.

use std::path::{Path, PathBuf};

use agora_api::ServerConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong shape.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// The environment variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `agora-config.yaml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgoraConfig {
    /// Where the API server listens.
    #[serde(default)]
    pub server: ServerSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Workload driver runs, executed in order.
    #[serde(default = "default_simulations")]
    pub simulations: Vec<SimulationRunConfig>,
}

impl Default for AgoraConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            logging: LoggingConfig::default(),
            simulations: default_simulations(),
        }
    }
}

impl AgoraConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the server address:
    /// - `AGORA_HOST` overrides `server.host`
    /// - `AGORA_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if `AGORA_PORT` is not a port number.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`AgoraConfig::from_file`] when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.server.apply_env_overrides()?;
            Ok(config)
        }
    }
}

/// Server bind address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSection {
    /// Apply `AGORA_HOST` and `AGORA_PORT` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `AGORA_PORT` does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("AGORA_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("AGORA_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
                    name: "AGORA_PORT",
                    reason: e.to_string(),
                    value: port.clone(),
                })?;
        }
        Ok(())
    }

    /// Convert into the API server's own configuration type.
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single-line records.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Master switch. When off, no subscriber output is produced.
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Record format.
    #[serde(default)]
    pub format: LogFormat,

    /// Append log records to this file instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

/// Parameters of one workload driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimulationRunConfig {
    /// Users to register, named `user0`, `user1`, ...
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Subreddits to create, named `sr0`, `sr1`, ...
    #[serde(default = "default_num_subreddits")]
    pub num_subreddits: usize,

    /// Posts to create in total.
    #[serde(default = "default_num_posts")]
    pub num_posts: usize,

    /// Comments per post.
    #[serde(default = "default_num_comments")]
    pub num_comments: usize,

    /// Votes per post.
    #[serde(default = "default_num_votes")]
    pub num_votes: usize,

    /// Direct messages to send in total.
    #[serde(default = "default_num_messages")]
    pub num_messages: usize,

    /// Join-or-leave toggles in total.
    #[serde(default = "default_num_memberships")]
    pub num_memberships: usize,

    /// Concurrent actors sharing the work.
    #[serde(default = "default_actors")]
    pub actors: usize,
}

impl Default for SimulationRunConfig {
    fn default() -> Self {
        Self {
            num_users: default_num_users(),
            num_subreddits: default_num_subreddits(),
            num_posts: default_num_posts(),
            num_comments: default_num_comments(),
            num_votes: default_num_votes(),
            num_messages: default_num_messages(),
            num_memberships: default_num_memberships(),
            actors: default_actors(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_simulations() -> Vec<SimulationRunConfig> {
    vec![SimulationRunConfig::default()]
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_logging_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_num_users() -> usize {
    100
}

const fn default_num_subreddits() -> usize {
    10
}

const fn default_num_posts() -> usize {
    200
}

const fn default_num_comments() -> usize {
    5
}

const fn default_num_votes() -> usize {
    10
}

const fn default_num_messages() -> usize {
    100
}

const fn default_num_memberships() -> usize {
    50
}

const fn default_actors() -> usize {
    8
}
