//! Configuration file support for lldpmap
//!
//! Loads and validates poller configuration from TOML files.
//! Default location: /etc/lldpmap/lldpmap.toml
//!
//! Every key is optional; command line options override file values.

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lldpmap_types::{LocalPortSemantic, RemotePortSemantic};

use crate::correlator::{CorrelationPlan, OrphanPolicy};
use crate::error::{LldpError, Result};
use crate::key::RemoteIndexLayout;
use crate::presenter::{OutputFormat, Presenter};
use crate::prune::PrunePolicy;
use crate::snmp::SnmpSettings;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/lldpmap/lldpmap.toml";

/// Device query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// IP address of the device; required before polling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// SNMPv2c community
    #[serde(default = "default_community")]
    pub community: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries per request after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// GETBULK max-repetitions
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: u32,
}

/// Which tables label the ports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldsConfig {
    #[serde(default)]
    pub local_port: LocalPortSemantic,

    #[serde(default)]
    pub remote_port: RemotePortSemantic,

    #[serde(default)]
    pub remote_index_layout: RemoteIndexLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,

    /// Drop records without remote data after correlation
    #[serde(default)]
    pub prune: bool,

    /// Must be set when `prune` is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prune_policy: Option<PrunePolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Quote CSV fields where needed
    #[serde(default)]
    pub csv_escape: bool,

    /// Indent JSON output
    #[serde(default)]
    pub pretty: bool,
}

/// Complete poller configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub fields: FieldsConfig,

    #[serde(default)]
    pub correlation: CorrelationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

// Default functions
fn default_community() -> String {
    "public".to_string()
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_retries() -> u32 {
    3
}

fn default_max_repetitions() -> u32 {
    50
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            target: None,
            community: default_community(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            max_repetitions: default_max_repetitions(),
        }
    }
}

impl PollerConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| {
                LldpError::config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(LldpError::Io(e)),
        }
    }

    /// Load configuration from a file that must exist
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LldpError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content).map_err(|e| {
            LldpError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load from the default location or defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parsed target address.
    pub fn target_addr(&self) -> Result<IpAddr> {
        let target = self
            .device
            .target
            .as_deref()
            .ok_or_else(|| LldpError::config("target address is not set"))?;
        target
            .trim()
            .parse()
            .map_err(|_| LldpError::config(format!("target address {target:?} is not a valid IP address")))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.device.timeout_ms)
    }

    /// Pruning policy in effect, if pruning is enabled.
    pub fn prune_policy(&self) -> Option<PrunePolicy> {
        if self.correlation.prune {
            self.correlation.prune_policy
        } else {
            None
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.target_addr()?;

        if self.device.timeout_ms == 0 {
            return Err(LldpError::config("timeout_ms must be > 0"));
        }

        if self.device.max_repetitions == 0 {
            return Err(LldpError::config("max_repetitions must be > 0"));
        }

        if i32::try_from(self.device.max_repetitions).is_err() {
            return Err(LldpError::config("max_repetitions is out of range"));
        }

        if self.correlation.prune && self.correlation.prune_policy.is_none() {
            return Err(LldpError::config(
                "prune is enabled but no prune_policy was chosen (both-empty or either-empty)",
            ));
        }

        Ok(())
    }

    pub fn snmp_settings(&self) -> Result<SnmpSettings> {
        Ok(SnmpSettings {
            target: self.target_addr()?,
            community: self.device.community.clone(),
            timeout: self.timeout(),
            retries: self.device.retries,
            max_repetitions: self.device.max_repetitions,
        })
    }

    pub fn correlation_plan(&self) -> CorrelationPlan {
        CorrelationPlan::new(self.fields.local_port, self.fields.remote_port)
            .with_layout(self.fields.remote_index_layout)
            .with_orphan_policy(self.correlation.orphan_policy)
    }

    pub fn presenter(&self) -> Presenter {
        Presenter::new(self.output.format)
            .with_csv_escape(self.output.csv_escape)
            .with_pretty(self.output.pretty)
    }
}
