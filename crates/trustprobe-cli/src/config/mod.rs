//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use trustprobe::ProbeConfig;

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Connect and handshake timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Directory holding TLS client identities as `<id>.pem`.
    pub identity_dir: Option<PathBuf>,

    /// Extra CA bundles or certificate directories to trust.
    #[serde(default)]
    pub trust_paths: Vec<PathBuf>,

    /// Ignore the system CA locations and trust only `trust_paths`.
    #[serde(default)]
    pub skip_system_trust: bool,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "trustprobe", "trustprobe")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;

        Ok(())
    }

    /// Update one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "connect_timeout" | "timeout" => {
                self.connect_timeout_secs = Some(value.parse()?);
            }
            "output_format" | "output" => {
                self.output_format = Some(value.parse()?);
            }
            "identity_dir" => {
                self.identity_dir = optional_path(value);
            }
            "trust_paths" => {
                self.trust_paths = value
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "skip_system_trust" => {
                self.skip_system_trust = value.parse()?;
            }
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\n\
                     Available keys:\n  \
                     connect_timeout    - Connect and handshake timeout in seconds\n  \
                     output_format      - Default output format (pretty/json)\n  \
                     identity_dir       - Directory of TLS client identities (empty to unset)\n  \
                     trust_paths        - Comma-separated extra CA bundles or directories\n  \
                     skip_system_trust  - Trust only trust_paths (true/false)",
                    key
                );
            }
        }
        Ok(())
    }

    /// Probe settings, with `timeout_override` taking precedence.
    pub fn probe_config(&self, timeout_override: Option<u64>) -> ProbeConfig {
        let mut probe = ProbeConfig::new().skip_system_trust(self.skip_system_trust);

        if let Some(secs) = timeout_override.or(self.connect_timeout_secs) {
            probe = probe.connect_timeout(Duration::from_secs(secs));
        }
        for path in &self.trust_paths {
            probe = probe.trust_path(path);
        }
        if let Some(dir) = &self.identity_dir {
            probe = probe.identity_dir(dir);
        }

        probe
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}
