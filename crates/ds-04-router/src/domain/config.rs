//! Directory service configuration with validation.

use ds_01_schema::SchemaExtensions;
use ds_03_referral::ReferralPolicyConfig;
use serde::{Deserialize, Serialize};
use shared_types::{Dn, Entry, ReferralMode};
use std::collections::{BTreeMap, HashSet};

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Partitions to register, in order
    pub partitions: Vec<PartitionConfig>,
    /// Referral mode of sessions that do not choose one
    pub default_referral_mode: ReferralMode,
    /// Target-referral policy per operation kind
    pub referral: ReferralPolicyConfig,
    /// Access control stage
    pub access: AccessControlConfig,
    /// Maintain createTimestamp/modifyTimestamp/creatorsName/modifiersName
    pub operational_attributes: bool,
    /// Schema definitions added to the core set
    pub schema: SchemaExtensions,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            partitions: Vec::new(),
            default_referral_mode: ReferralMode::Throw,
            referral: ReferralPolicyConfig::default(),
            access: AccessControlConfig::default(),
            operational_attributes: true,
            schema: SchemaExtensions::default(),
        }
    }
}

impl DirectoryConfig {
    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Validate configuration. Suffix overlap is checked by the partition
    /// registry at registration time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut ids = HashSet::new();
        for partition in &self.partitions {
            if partition.id.trim().is_empty() {
                return Err(ConfigError::EmptyPartitionId);
            }
            if !ids.insert(partition.id.as_str()) {
                return Err(ConfigError::DuplicatePartitionId(partition.id.clone()));
            }
            partition.suffix_dn()?;
        }

        for admin in &self.access.administrators {
            Dn::parse(admin).map_err(|e| ConfigError::InvalidAdministrator {
                dn: admin.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// One storage partition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Partition identifier
    pub id: String,
    /// Naming suffix owned by the partition
    pub suffix: String,
    /// Attributes of the suffix entry, created at startup if absent
    pub context_entry: Option<BTreeMap<String, Vec<String>>>,
}

impl PartitionConfig {
    /// Parsed suffix.
    pub fn suffix_dn(&self) -> Result<Dn, ConfigError> {
        let suffix = Dn::parse(&self.suffix).map_err(|e| ConfigError::InvalidSuffix {
            id: self.id.clone(),
            reason: e.to_string(),
        })?;
        if suffix.is_root() {
            return Err(ConfigError::InvalidSuffix {
                id: self.id.clone(),
                reason: "suffix is empty".into(),
            });
        }
        Ok(suffix)
    }

    /// The context entry, if configured.
    pub fn context_entry(&self, suffix: &Dn) -> Option<Entry> {
        self.context_entry.as_ref().map(|attributes| {
            let mut entry = Entry::new(suffix.clone());
            for (id, values) in attributes {
                for value in values {
                    entry.push_value(id, value);
                }
            }
            entry
        })
    }
}

/// Access control stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Allow reads (search, compare, lookup, exists) without a principal
    pub allow_anonymous_reads: bool,
    /// Principals allowed to write; empty means any authenticated principal
    pub administrators: Vec<String>,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            allow_anonymous_reads: true,
            administrators: Vec::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A partition has no id
    #[error("partition id cannot be empty")]
    EmptyPartitionId,
    /// Two partitions share an id
    #[error("duplicate partition id: {0}")]
    DuplicatePartitionId(String),
    /// Suffix does not parse
    #[error("invalid suffix for partition {id}: {reason}")]
    InvalidSuffix {
        /// Partition id
        id: String,
        /// Parse failure
        reason: String,
    },
    /// Administrator name does not parse
    #[error("invalid administrator {dn}: {reason}")]
    InvalidAdministrator {
        /// Configured name
        dn: String,
        /// Parse failure
        reason: String,
    },
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for shared_types::DirectoryError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}
