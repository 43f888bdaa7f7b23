//! Configuration Management
//!
//! Cluster connection settings live in a YAML file under a
//! `cohesity_config` key, so a Salt master config can be pointed at
//! directly. Environment variables override the file.

use crate::cohesity::client::ClusterConnection;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DOMAIN: &str = "LOCAL";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Top-level config file layout
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub cohesity_config: Config,
}

/// Cluster settings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub cluster_vip: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub domain: Option<String>,
    /// Verify the cluster TLS certificate (clusters often use self-signed ones)
    #[serde(default)]
    pub verify_tls: Option<bool>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cohesity-ops").join("config.yaml"))
    }

    /// Parse the `cohesity_config` section of a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse configuration")?;
        Ok(file.cohesity_config)
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_yaml(&content)?
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => {
                    let content = std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read config file {}", path.display())
                    })?;
                    Self::from_yaml(&content)?
                }
                _ => Self::default(),
            },
        };

        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Apply `COHESITY_*` overrides from `lookup`
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("COHESITY_CLUSTER_VIP") {
            self.cluster_vip = v;
        }
        if let Some(v) = lookup("COHESITY_USERNAME") {
            self.username = v;
        }
        if let Some(v) = lookup("COHESITY_PASSWORD") {
            self.password = v;
        }
        if let Some(v) = lookup("COHESITY_DOMAIN") {
            self.domain = Some(v);
        }
        self
    }

    /// Effective domain (config > `LOCAL`)
    pub fn effective_domain(&self) -> String {
        self.domain
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DOMAIN.to_string())
    }

    /// Build the connection handed to the client
    pub fn connection(&self) -> ClusterConnection {
        ClusterConnection {
            endpoint: self.cluster_vip.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            domain: self.effective_domain(),
            verify_tls: self.verify_tls.unwrap_or(true),
            timeout: Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
