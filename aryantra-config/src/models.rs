use std::{path::PathBuf, time::Duration};

use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where and how contact submissions are forwarded.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub upstream_url: Url,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn is_plain_http(&self) -> bool {
        self.upstream_url.scheme() == "http"
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin, like a bare `cors()` middleware.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }

    pub fn is_permissive(&self) -> bool {
        self.allowed_origins.is_empty() || self.is_wildcard_included()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSource {
    Default,
    File,
    /// `PORT`, the conventional platform override.
    EnvPort,
    EnvServerPort,
}

#[derive(Debug, Clone)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
    pub port_source: PortSource,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        Self {
            config_path: None,
            env_file_loaded: false,
            port_source: PortSource::Default,
        }
    }
}
