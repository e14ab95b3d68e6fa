//! Redline configuration loading from `redline.toml`.
//!
//! Configuration is optional: every section and every key has a default, so a
//! missing file yields a working heuristic-only service on localhost.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 9130
//!
//! [classifier]
//! endpoint = "https://classifier.internal/v1/categorize"
//! api_key_env = "REDLINE_CLASSIFIER_KEY"
//! timeout_secs = 15
//! max_batch = 50
//! max_text_chars = 500
//!
//! [limits]
//! max_input_chars = 2000000
//! ```

use redline_core::ClassifierPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "redline.toml";

/// Errors from strict configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure loaded from `redline.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct RedlineConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// External classification service.
    #[serde(default)]
    pub classifier: ClassifierSettings,

    /// Input bounds.
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9130
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// External classifier settings.
///
/// Secrets are never stored in the file; the `*_env` keys name the
/// environment variables that hold them.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Batch endpoint. Without one, only the local heuristics run.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Variable holding a static bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// OAuth2 client-credentials token endpoint. Takes precedence over the
    /// static key when set.
    #[serde(default)]
    pub token_url: Option<String>,

    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,

    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

fn default_api_key_env() -> String {
    "REDLINE_CLASSIFIER_API_KEY".to_string()
}

fn default_client_id_env() -> String {
    "REDLINE_CLASSIFIER_CLIENT_ID".to_string()
}

fn default_client_secret_env() -> String {
    "REDLINE_CLASSIFIER_CLIENT_SECRET".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_batch() -> usize {
    50
}

fn default_max_text_chars() -> usize {
    500
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            token_url: None,
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            timeout_secs: default_timeout_secs(),
            max_batch: default_max_batch(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl ClassifierSettings {
    /// Batch and timeout policy for the core classifier.
    pub fn policy(&self) -> ClassifierPolicy {
        ClassifierPolicy {
            max_batch: self.max_batch,
            timeout: Duration::from_secs(self.timeout_secs),
            max_text_chars: self.max_text_chars,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Largest text, in chars, accepted by `/compare`.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Largest request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_max_input_chars() -> usize {
    2_000_000
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl RedlineConfig {
    /// Load `redline.toml` from `dir`.
    ///
    /// A missing file yields defaults. Read and parse errors are logged as
    /// warnings and also yield defaults.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Load an explicitly named file, failing on any error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
