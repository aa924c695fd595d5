//! YAML configuration schema (§6 External Interfaces).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use herald_probe::Probe;
use herald_service::Service;

fn default_metrics_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Top-level configuration, loaded from a single YAML file whose path is
/// injected by the caller (CLI flag or `HERALD_CONFIG` env var).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub speaker: SpeakerConfig,
    #[serde(default)]
    pub bfd: Option<BfdConfig>,
    pub api: ApiConfig,
    #[serde(default)]
    pub neighbors: Vec<Neighbor>,
    #[serde(default)]
    pub prefixes: Vec<Prefix>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load and parse the YAML file at `path`. Any failure here is a
    /// **Configuration fatal** error: the caller aborts startup with a
    /// non-zero exit before any task is spawned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&bytes).map_err(|source| Error::ParseConfig {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerConfig {
    pub asn: u32,
    pub router_id: String,
    #[serde(default)]
    pub graceful_restart_enabled: bool,
    #[serde(default)]
    pub graceful_restart_restart_time: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BfdConfig {
    #[serde(default)]
    pub enabled: bool,
    pub listen_address: String,
    pub listen_port: u16,
    #[serde(with = "humantime_serde")]
    pub minimum_reception_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub minimum_transmission_interval: Duration,
    pub detection_multiplier: u8,
    #[serde(default)]
    pub passive: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    pub listen_address: String,
    pub listen_port: u16,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor {
    pub address: String,
    pub asn: u32,
    #[serde(default)]
    pub ebgp_multihop_enabled: bool,
}

/// An anycast prefix to conditionally announce. Immutable for the life of
/// the daemon run.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefix {
    pub ip_address: String,
    pub next_hop: String,
    pub asn: u32,
    #[serde(default)]
    pub communities: Vec<String>,
    #[serde(default)]
    pub as_path_prepend: Vec<u32>,
    #[serde(default)]
    pub multi_exit_discriminator: u32,
    #[serde(default)]
    pub withdraw_on_down: bool,
    #[serde(default)]
    pub maintenance: String,

    pub service: Option<Service>,

    #[serde(default)]
    pub startup_probe: Option<Probe>,
    #[serde(default)]
    pub liveness_probe: Option<Probe>,
    #[serde(default)]
    pub readiness_probe: Option<Probe>,
}

impl Prefix {
    /// A stable display label for log fields and metric labels when the
    /// prefix carries no more specific name (the `name` metric label is the
    /// service name when present, else the ip address).
    pub fn metric_name(&self) -> &str {
        self.service
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(self.ip_address.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogDriver {
    #[default]
    File,
    Syslog,
    Journald,
    Windows,
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default)]
    pub driver: LogDriver,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            driver: LogDriver::default(),
            format: LogFormat::default(),
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub listen_address: String,
    #[serde(default)]
    pub listen_port: u16,
    #[serde(default = "default_metrics_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: String::new(),
            listen_port: 0,
            interval: default_metrics_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r#"
speaker:
  asn: 65000
  routerId: 192.0.2.1
api:
  listenAddress: 127.0.0.1
  listenPort: 50051
neighbors:
  - address: 192.0.2.254
    asn: 65001
prefixes:
  - ipAddress: 10.0.0.1/32
    nextHop: 192.0.2.1
    asn: 65000
    communities: ["100", "65000:1", "garbage"]
    readinessProbe:
      http:
        port: 8080
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.speaker.asn, 65000);
        assert_eq!(cfg.prefixes.len(), 1);
        assert_eq!(cfg.prefixes[0].communities.len(), 3);
        assert!(cfg.prefixes[0].readiness_probe.is_some());
    }
}
