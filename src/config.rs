//! Netboot configuration
//!
//! The configuration is built once, either with the `with_*` builders or
//! from a TOML file, and handed to [`crate::Netboot`] at construction:
//!
//! ```toml
//! boot_interface = "eth0"
//! lease_timeout_secs = 30
//! lease_retries = 5
//! dry_run = false
//!
//! [filter]
//! remove = ["console"]
//! reuse = ["console"]
//! append = "ip=dhcp"
//! ```

use netboot_cmdline::FilterSpec;
use netboot_dhcp::LeaseOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Interface attempted when none is configured
pub const DEFAULT_BOOT_INTERFACE: &str = "eth0";

/// Error loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Netboot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetbootConfig {
    /// Only interfaces with this name are attempted
    pub boot_interface: String,

    /// Per-exchange DHCP timeout, `lease_timeout_secs` in TOML (fractions
    /// allowed)
    #[serde(rename = "lease_timeout_secs", with = "duration_secs")]
    pub lease_timeout: Duration,

    /// DHCP retries within one lease attempt
    pub lease_retries: u32,

    /// Report the resolved image instead of executing it
    pub dry_run: bool,

    /// Command-line rewrite applied to the resolved image
    pub filter: FilterSpec,
}

impl Default for NetbootConfig {
    fn default() -> Self {
        let lease = LeaseOptions::default();
        Self {
            boot_interface: DEFAULT_BOOT_INTERFACE.to_string(),
            lease_timeout: lease.timeout,
            lease_retries: lease.retries,
            dry_run: false,
            filter: FilterSpec::default(),
        }
    }
}

impl NetbootConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interface to boot from
    pub fn with_boot_interface(mut self, name: impl Into<String>) -> Self {
        self.boot_interface = name.into();
        self
    }

    /// Set the DHCP timeout
    pub fn with_lease_timeout(mut self, timeout: Duration) -> Self {
        self.lease_timeout = timeout;
        self
    }

    /// Set the DHCP retry count
    pub fn with_lease_retries(mut self, retries: u32) -> Self {
        self.lease_retries = retries;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the command-line filter
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    /// Lease bounds derived from this configuration
    pub fn lease_options(&self) -> LeaseOptions {
        LeaseOptions::new(self.lease_timeout, self.lease_retries)
    }

    /// Parse a TOML configuration; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// Check the values a run depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boot_interface.trim().is_empty() {
            return Err(ConfigError::Invalid("boot_interface must not be empty".to_string()));
        }
        if self.lease_timeout.is_zero() {
            return Err(ConfigError::Invalid("lease timeout must be positive".to_string()));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
