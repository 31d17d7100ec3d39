/// Configuration management for pasarela
///
/// The enclosing proxy loads one [`ProxyConfig`] per process and uses the
/// per-cluster sections to drive [`crate::initialize_connection_config`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::core::ClusterType;
use crate::error::{ConfigError, PasarelaResult};
use crate::{initialize_connection_config, ConnectionConfig, ConnectionParams};

/// Proxy-level configuration: one cluster section per side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// The cluster reads and writes originate from
    pub origin: ClusterConfig,
    /// The cluster being migrated to
    pub target: ClusterConfig,
}

/// Connection settings for one cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Path to a secure connect bundle; empty selects generic mode
    #[serde(default)]
    pub secure_connect_bundle_path: String,
    /// Contact points for generic mode (hostnames or IPs)
    #[serde(default)]
    pub contact_points: Vec<String>,
    /// Default port for generic contact points
    pub port: u16,
    /// Connection timeout in milliseconds
    pub connection_timeout_ms: u64,
    /// Local datacenter for generic mode; astra mode discovers its own
    #[serde(default)]
    pub datacenter: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            secure_connect_bundle_path: String::new(),
            contact_points: vec!["127.0.0.1".to_string()],
            port: 9042,
            connection_timeout_ms: 30000,
            datacenter: String::new(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            origin: ClusterConfig::default(),
            target: ClusterConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: ProxyConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin.validate("origin")?;
        self.target.validate("target")?;
        Ok(())
    }

    /// Create example configuration file
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let config = ProxyConfig {
            origin: ClusterConfig {
                secure_connect_bundle_path: String::new(),
                contact_points: vec![
                    "10.0.1.10".to_string(),
                    "10.0.1.11".to_string(),
                    "10.0.1.12".to_string(),
                ],
                port: 9042,
                connection_timeout_ms: 30000,
                datacenter: "dc1".to_string(),
            },
            target: ClusterConfig {
                secure_connect_bundle_path: "/etc/pasarela/secure-connect-target.zip".to_string(),
                contact_points: Vec::new(),
                port: 9042,
                connection_timeout_ms: 30000,
                datacenter: String::new(),
            },
        };

        config.save_to_file(path)
    }
}

impl ClusterConfig {
    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{label}: port must be greater than 0"
            )));
        }

        if self.connection_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{label}: connection_timeout_ms must be greater than 0"
            )));
        }

        if self.secure_connect_bundle_path.is_empty() && self.contact_points.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{label}: either a secure connect bundle or contact points are required"
            )));
        }

        if !self.secure_connect_bundle_path.is_empty() && !self.contact_points.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{label}: a secure connect bundle and explicit contact points are mutually exclusive"
            )));
        }

        Ok(())
    }

    /// Factory inputs for this cluster
    pub fn connection_params(&self, cluster_type: ClusterType) -> ConnectionParams {
        ConnectionParams {
            secure_connect_bundle_path: self.secure_connect_bundle_path.clone(),
            contact_points: self.contact_points.clone(),
            port: self.port,
            connection_timeout_ms: self.connection_timeout_ms,
            cluster_type,
            datacenter: self.datacenter.clone(),
        }
    }

    /// Bootstrap the connection configuration for this cluster
    pub async fn initialize(
        &self,
        cluster_type: ClusterType,
    ) -> PasarelaResult<Arc<dyn ConnectionConfig>> {
        initialize_connection_config(self.connection_params(cluster_type)).await
    }
}
