//! Configuration loading for Firechem.
//! Reads firechem.toml from the current directory or the path in the
//! FIRECHEM_CONFIG env var, then applies environment overrides.

use std::path::{Path, PathBuf};

use firechem_common::gate::DEFAULT_NON_ORGANIC_CATEGORIES;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "FIRECHEM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "firechem.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub pubchem: PubchemConfig,
    #[serde(default)]
    pub gate: GateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind()      -> String { "127.0.0.1:3001".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn bool_true()         -> bool   { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

/// Dataset overrides. When unset the built-in dataset is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataConfig {
    pub chemicals_path: Option<PathBuf>,
    pub compatibility_path: Option<PathBuf>,
}

/// How results are retrieved after a job is submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorMode {
    /// One streamed GET carrying server-sent events.
    #[default]
    Stream,
    /// Repeated GETs on a job status URL.
    Poll,
}

impl PredictorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictorMode::Stream => "stream",
            PredictorMode::Poll => "poll",
        }
    }
}

/// How the API key is presented to the prediction service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    #[default]
    None,
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `Authorization: <key>`
    Raw,
}

#[derive(Debug, Deserialize)]
pub struct PredictorConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_predictor_url")]
    pub base_url: String,
    #[serde(default)]
    pub mode: PredictorMode,
    #[serde(default = "default_predictor_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub auth: AuthScheme,
    #[serde(default)]
    pub api_key: Option<SecretString>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_predictor_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_alternates")]
    pub max_alternates: usize,
}

fn default_predictor_url()      -> String { "https://roiez-fire-chem-predict.hf.space/gradio_api".to_string() }
fn default_predictor_endpoint() -> String { "predict".to_string() }
fn default_poll_interval_ms()   -> u64    { 2_000 }
fn default_max_attempts()       -> u32    { 15 }
fn default_predictor_timeout()  -> u64    { 60 }
fn default_max_alternates()     -> usize  { 5 }

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            enabled: bool_true(),
            base_url: default_predictor_url(),
            mode: PredictorMode::default(),
            endpoint: default_predictor_endpoint(),
            auth: AuthScheme::default(),
            api_key: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_predictor_timeout(),
            max_alternates: default_max_alternates(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubchemConfig {
    #[serde(default = "default_pubchem_url")]
    pub base_url: String,
    #[serde(default = "default_pubchem_timeout")]
    pub request_timeout_secs: u64,
}

fn default_pubchem_url()     -> String { "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string() }
fn default_pubchem_timeout() -> u64    { 15 }

impl Default for PubchemConfig {
    fn default() -> Self {
        Self {
            base_url: default_pubchem_url(),
            request_timeout_secs: default_pubchem_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_non_organic")]
    pub non_organic_categories: Vec<String>,
}

fn default_non_organic() -> Vec<String> {
    DEFAULT_NON_ORGANIC_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { non_organic_categories: default_non_organic() }
    }
}

impl Config {
    /// Load configuration from firechem.toml.
    /// Checks FIRECHEM_CONFIG env var first, then the current directory.
    /// A missing default file means built-in defaults; a missing file named by
    /// FIRECHEM_CONFIG is an error.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_ENV).ok();
        let path = explicit
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            info!(path = %path, "Loading configuration");
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::NotFound(PathBuf::from(path)));
        } else {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply FIRECHEM_* overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("FIRECHEM_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = lookup("FIRECHEM_PREDICTOR_URL") {
            self.predictor.base_url = url;
        }
        if let Some(key) = lookup("FIRECHEM_PREDICTOR_API_KEY").filter(|k| !k.is_empty()) {
            self.predictor.api_key = Some(SecretString::from(key));
        }
        if let Some(url) = lookup("FIRECHEM_PUBCHEM_URL") {
            self.pubchem.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.predictor.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("predictor.base_url is empty".to_string()));
        }
        if self.pubchem.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("pubchem.base_url is empty".to_string()));
        }
        if self.predictor.max_attempts == 0 {
            return Err(ConfigError::Invalid("predictor.max_attempts must be at least 1".to_string()));
        }
        if self.predictor.auth != AuthScheme::None && self.predictor.api_key.is_none() {
            return Err(ConfigError::Invalid(
                "predictor.auth requires predictor.api_key or FIRECHEM_PREDICTOR_API_KEY".to_string(),
            ));
        }
        Ok(())
    }
}
