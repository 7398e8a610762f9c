use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides, e.g. `IMAGE_AGENT__SERVER__PORT`.
pub const ENV_PREFIX: &str = "IMAGE_AGENT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub agent: AgentDefinitionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where the external agent runtime lives and how long we wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinitionConfig {
    #[serde(default = "default_definition_path")]
    pub definition_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Chat sessions untouched for this long are dropped.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_definition_path() -> String {
    "agents_workspace/image_agent/agent.yaml".to_string()
}

fn default_title() -> String {
    "Image Analysis Agent".to_string()
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_history_limit() -> usize {
    50
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_session_idle_secs() -> u64 {
    60 * 60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AgentDefinitionConfig {
    /// True when the path differs from the bundled default location.
    pub fn is_configured(&self) -> bool {
        self.definition_path != default_definition_path()
    }
}

impl Default for AgentDefinitionConfig {
    fn default() -> Self {
        Self {
            definition_path: default_definition_path(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            max_upload_bytes: default_max_upload_bytes(),
            history_limit: default_history_limit(),
            static_dir: default_static_dir(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl Config {
    /// Load settings from an optional YAML file, then apply `IMAGE_AGENT__*`
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Yaml).required(true),
            );
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Pick the first config file that exists among `$CONFIG_PATH` and the
    /// conventional locations.
    pub fn discover_path() -> Option<std::path::PathBuf> {
        let candidates: Vec<String> = vec![
            std::env::var("CONFIG_PATH").ok(),
            Some("config/app.yaml".to_string()),
            Some("app.yaml".to_string()),
        ]
        .into_iter()
        .flatten()
        .collect();

        for candidate in candidates {
            let path = std::path::PathBuf::from(&candidate);
            if path.exists() {
                return Some(path);
            }
            tracing::debug!("Config candidate not found: {}", candidate);
        }
        None
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
