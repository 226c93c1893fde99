//! # Directory Node
//!
//! Bootstrap for the directory service.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (JSON file from the command line or `DS_CONFIG`,
//!    built-in defaults otherwise; `DS_DEFAULT_REFERRAL_MODE` overrides the
//!    session default)
//! 2. Validate configuration
//! 3. Build schema and partitions; overlapping suffixes abort startup
//! 4. Seed configured context entries
//! 5. Signal ready

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ds_04_router::{AccessControlConfig, DirectoryConfig, DirectoryService, PartitionConfig};
use tracing::{info, warn};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DS_CONFIG";

/// Environment variable overriding the default referral mode.
pub const MODE_ENV: &str = "DS_DEFAULT_REFERRAL_MODE";

/// Built-in configuration: one `ou=system` partition administered by
/// `uid=admin,ou=system`.
pub fn default_config() -> DirectoryConfig {
    let mut context = BTreeMap::new();
    context.insert(
        "objectClass".to_string(),
        vec!["top".to_string(), "organizationalUnit".to_string()],
    );
    context.insert("ou".to_string(), vec!["system".to_string()]);

    DirectoryConfig {
        partitions: vec![PartitionConfig {
            id: "system".into(),
            suffix: "ou=system".into(),
            context_entry: Some(context),
        }],
        access: AccessControlConfig {
            allow_anonymous_reads: true,
            administrators: vec!["uid=admin,ou=system".into()],
        },
        ..DirectoryConfig::default()
    }
}

/// Configuration file from the first argument, else from `DS_CONFIG`.
pub fn config_path(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    args.next()
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
}

/// Load and validate configuration.
pub fn load_config(path: Option<&Path>) -> Result<DirectoryConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = DirectoryConfig::from_json(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            config
        }
        None => {
            info!("No config file given, using built-in defaults");
            default_config()
        }
    };

    if let Ok(mode) = std::env::var(MODE_ENV) {
        match mode.parse() {
            Ok(mode) => {
                config.default_referral_mode = mode;
                info!("Default referral mode set to {} from environment", mode);
            }
            Err(e) => warn!("Ignoring {}: {}", MODE_ENV, e),
        }
    }

    config
        .validate()
        .context("Invalid directory configuration")?;
    Ok(config)
}

/// A running directory service.
pub struct DirectoryNode {
    service: DirectoryService,
}

impl DirectoryNode {
    /// Build the service and seed its context entries.
    pub async fn start(config: &DirectoryConfig) -> Result<Self> {
        info!("===========================================");
        info!("  Directory Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let service = DirectoryService::from_config(config)
            .await
            .context("Failed to start directory service")?;

        for suffix in service.naming_contexts() {
            info!("Naming context: {}", suffix);
        }
        info!("Default referral mode: {}", config.default_referral_mode);

        Ok(Self { service })
    }

    /// Service handle.
    pub fn service(&self) -> &DirectoryService {
        &self.service
    }

    /// Stop the node.
    pub async fn shutdown(self) {
        info!("Shutting down directory node");
        drop(self.service);
        info!("Shutdown complete");
    }
}
