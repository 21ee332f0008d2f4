// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Webhook Configuration Types
//
// Defines the configuration schema for the poolguard admission webhook:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - HTTP server settings and per-request deadline
// - Catalog backend (Kubernetes API server or in-memory snapshot)
// - Logging and metrics settings

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_API_VERSION: &str = "poolguard.io/v1";
pub const CONFIG_KIND: &str = "WebhookConfig";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level Kubernetes-style webhook configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfigManifest {
    /// API version (must be "poolguard.io/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "WebhookConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: WebhookConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable name of this webhook deployment
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub catalog: CatalogBackend,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on the catalog reads of a single admission request.
    /// Keep below the webhook's `timeoutSeconds` so the decision is ours.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Where node pools and platform admins are listed from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CatalogBackend {
    /// Fixed snapshot, for development and `poolguard check`
    InMemory {
        #[serde(default)]
        node_pools: Vec<String>,
        #[serde(default)]
        platform_admins: Vec<PlatformAdminSeed>,
    },
    /// Live cluster state through the Kubernetes API server
    Kubernetes(KubernetesCatalogConfig),
}

impl Default for CatalogBackend {
    fn default() -> Self {
        Self::InMemory {
            node_pools: vec![],
            platform_admins: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAdminSeed {
    pub name: String,
    #[serde(default)]
    pub node_pools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KubernetesCatalogConfig {
    #[serde(default = "default_api_server")]
    pub api_server: String,

    /// Bearer token file, re-read on every request so rotated tokens are picked up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<String>,

    /// PEM bundle used to verify the API server certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_path: Option<String>,

    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

impl Default for KubernetesCatalogConfig {
    fn default() -> Self {
        Self {
            api_server: default_api_server(),
            token_path: Some(
                "/var/run/secrets/kubernetes.io/serviceaccount/token".to_string(),
            ),
            ca_path: Some("/var/run/secrets/kubernetes.io/serviceaccount/ca.crt".to_string()),
            insecure_skip_tls_verify: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus exposition
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_metrics_port(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9443
}

fn default_request_timeout() -> u64 {
    10
}

fn default_api_server() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for WebhookConfigManifest {
    fn default() -> Self {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "poolguard".to_string());

        Self {
            api_version: CONFIG_API_VERSION.to_string(),
            kind: CONFIG_KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                version: Some("1.0.0".to_string()),
            },
            spec: WebhookConfigSpec::default(),
        }
    }
}

impl WebhookConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. POOLGUARD_CONFIG_PATH environment variable
    /// 2. ./poolguard-config.yaml (working directory)
    /// 3. ~/.poolguard/config.yaml (user home)
    /// 4. /etc/poolguard/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("POOLGUARD_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./poolguard-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".poolguard").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/poolguard/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // An explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(config_path)?
            }
            None => {
                tracing::warn!("No configuration file found in standard locations. Using empty defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("POOLGUARD_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: POOLGUARD_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid value for POOLGUARD_PORT: '{}'. Ignoring.", val);
                }
            }
        }

        if let Ok(server) = std::env::var("POOLGUARD_API_SERVER") {
            match &mut self.spec.catalog {
                CatalogBackend::Kubernetes(kube) => {
                    tracing::info!("Environment override: POOLGUARD_API_SERVER={}", server);
                    kube.api_server = server;
                }
                CatalogBackend::InMemory { .. } => {
                    tracing::warn!("POOLGUARD_API_SERVER is set but the catalog backend is in-memory. Ignoring.");
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_version != CONFIG_API_VERSION {
            return Err(ConfigError::Invalid(format!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version, CONFIG_API_VERSION
            )));
        }

        if self.kind != CONFIG_KIND {
            return Err(ConfigError::Invalid(format!(
                "Invalid kind: '{}'. Must be '{}'",
                self.kind, CONFIG_KIND
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(ConfigError::Invalid("metadata.name cannot be empty".into()));
        }

        if self.spec.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "spec.server.request_timeout_seconds must be greater than zero".into(),
            ));
        }

        match &self.spec.catalog {
            CatalogBackend::Kubernetes(kube) => {
                if kube.api_server.is_empty() {
                    return Err(ConfigError::Invalid("spec.catalog.api_server cannot be empty".into()));
                }
            }
            CatalogBackend::InMemory { node_pools, platform_admins } => {
                let mut seen = HashSet::new();
                for pool in node_pools {
                    if !seen.insert(pool.as_str()) {
                        return Err(ConfigError::Invalid(format!("Duplicate node pool '{}'", pool)));
                    }
                }

                let mut seen = HashSet::new();
                for admin in platform_admins {
                    if admin.name.is_empty() {
                        return Err(ConfigError::Invalid("PlatformAdmin name cannot be empty".into()));
                    }
                    if !seen.insert(admin.name.as_str()) {
                        return Err(ConfigError::Invalid(format!(
                            "Duplicate PlatformAdmin '{}'",
                            admin.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
