//! Service configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or none at all) yields a
//! working service against the public climate-service endpoint. A few
//! deployment-specific values can be overridden from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::vocab;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HACID_KG_CONFIG";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
}

/// HTTP listener and static data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// JSON file served by `/knowledge-graph/tasks`.
    #[serde(default = "default_tasks_file")]
    pub tasks_file: PathBuf,
}

/// Remote SPARQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_endpoint_url")]
    pub url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a connectivity failure or gateway error.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay; doubled on every retry.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Resolution engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Identifier that selects the method hierarchy.
    #[serde(default = "default_method_sentinel")]
    pub method_sentinel: String,
    /// Root of the method specialization tree.
    #[serde(default = "default_method_anchor")]
    pub method_anchor: String,
    /// Role whose expected type enumerates the hazards.
    #[serde(default = "default_hazard_role")]
    pub hazard_role: String,
    /// Types never admitted to the expansion frontier.
    #[serde(default = "default_excluded_types")]
    pub excluded_types: Vec<String>,
    /// Labels hidden from the hazard listing (case-insensitive).
    #[serde(default = "default_hazard_excluded_labels")]
    pub hazard_excluded_labels: Vec<String>,
    /// Label languages accepted by the instance listing.
    #[serde(default = "default_instance_languages")]
    pub instance_languages: Vec<String>,
    /// Cap on type-expansion and instance results.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

fn default_bind() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_tasks_file() -> PathBuf {
    PathBuf::from("data/tasks.json")
}
fn default_endpoint_url() -> String {
    vocab::DEFAULT_ENDPOINT.into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    200
}
fn default_method_sentinel() -> String {
    vocab::METHOD_SENTINEL.into()
}
fn default_method_anchor() -> String {
    vocab::CLIMATE_CASE_METHOD.into()
}
fn default_hazard_role() -> String {
    vocab::HAZARD_ASSOCIATED_DATA.into()
}
fn default_excluded_types() -> Vec<String> {
    vec![vocab::INTERVAL.into()]
}
fn default_hazard_excluded_labels() -> Vec<String> {
    vec![vocab::CLIMATE_HAZARD_TYPE_LABEL.into()]
}
fn default_instance_languages() -> Vec<String> {
    vec!["en".into(), "en-gb".into(), "en-us".into()]
}
fn default_result_limit() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            tasks_file: default_tasks_file(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            method_sentinel: default_method_sentinel(),
            method_anchor: default_method_anchor(),
            hazard_role: default_hazard_role(),
            excluded_types: default_excluded_types(),
            hazard_excluded_labels: default_hazard_excluded_labels(),
            instance_languages: default_instance_languages(),
            result_limit: default_result_limit(),
        }
    }
}

impl ServiceConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse TOML text; `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply `HACID_KG_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("HACID_KG_BIND") {
            self.server.bind = bind;
        }
        if let Some(port) = lookup("HACID_KG_PORT") {
            self.server.port = port.parse().map_err(|e| ConfigError::Invalid {
                key: "HACID_KG_PORT".into(),
                message: format!("{port:?}: {e}"),
            })?;
        }
        if let Some(url) = lookup("HACID_KG_ENDPOINT") {
            self.endpoint.url = url;
        }
        if let Some(file) = lookup("HACID_KG_TASKS_FILE") {
            self.server.tasks_file = PathBuf::from(file);
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> ConfigResult<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<effective config>".into(),
            message: e.to_string(),
        })
    }
}
