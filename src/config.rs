//! Configuration management for nscheck
//!
//! This module defines the main `Config` struct and its sections. It uses
//! the `figment` crate to layer built-in defaults, an optional TOML file,
//! `NSCHECK_`-prefixed environment variables and command-line flags, in
//! that order of precedence.

use crate::{
    cli::Cli,
    ranking::FailedProbePolicy,
    sources::{endpoint::is_valid_endpoint_url, fallback::split_list},
};
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The logging level, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// The resolver configuration file that is read and rewritten.
    pub resolv_conf: ResolvConfConfig,
    /// Where candidate nameservers come from.
    pub discovery: DiscoveryConfig,
    /// Reachability probing.
    pub probe: ProbeConfig,
    /// How many nameservers end up in the file.
    pub selection: SelectionConfig,
    /// Cycle timing.
    pub scheduler: SchedulerConfig,
    /// Prometheus exporter.
    pub metrics: MetricsConfig,
}

/// Configuration for the resolver configuration file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ResolvConfConfig {
    pub path: PathBuf,
    /// Written verbatim as the `options` line. Empty suppresses the line.
    pub options: String,
    /// Written verbatim as the `search` line. Empty suppresses the line.
    pub search: String,
    /// Replace the file via a temporary file and rename. Disable when the
    /// target is a bind mount that cannot be renamed over.
    pub atomic_write: bool,
}

/// Configuration for nameserver discovery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// The remote endpoint queried on the first cycle.
    pub endpoint_url: String,
    /// Timeout for the whole HTTP exchange, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Comma-separated fallback nameservers, always added to the candidates.
    pub fallback_nameservers: String,
}

/// Configuration for the reachability probe.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe connect timeout, in milliseconds.
    pub timeout_ms: u64,
    /// TCP port to connect to.
    pub port: u16,
    /// Whether failed nameservers are dropped or kept after the reachable ones.
    pub failed_policy: FailedProbePolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of nameservers written back.
    pub max_nameservers: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause between the end of one cycle and the start of the next, in seconds.
    pub interval_seconds: u64,
}

/// Configuration for the metrics exporter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub listen_address: SocketAddr,
}

impl Config {
    /// Loads the configuration from defaults, the optional file named by
    /// `cli.config`, the environment and the command line, then validates it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            if !path.exists() {
                bail!("configuration file {} does not exist", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g. NSCHECK_PROBE__TIMEOUT_MS=500
            .merge(Env::prefixed("NSCHECK_").split("__"))
            .merge(cli.clone())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would break a cycle.
    pub fn validate(&self) -> Result<()> {
        if self.resolv_conf.path.as_os_str().is_empty() {
            bail!("resolv_conf.path must not be empty");
        }
        if split_list(&self.discovery.fallback_nameservers).is_empty() {
            bail!("discovery.fallback_nameservers must contain at least one nameserver");
        }
        if !is_valid_endpoint_url(&self.discovery.endpoint_url) {
            bail!(
                "discovery.endpoint_url '{}' is not a valid http(s) URL",
                self.discovery.endpoint_url
            );
        }
        if self.discovery.fetch_timeout_ms == 0 {
            bail!("discovery.fetch_timeout_ms must be greater than zero");
        }
        if self.probe.timeout_ms == 0 {
            bail!("probe.timeout_ms must be greater than zero");
        }
        if self.selection.max_nameservers == 0 {
            bail!("selection.max_nameservers must be greater than zero");
        }
        if self.scheduler.interval_seconds == 0 {
            bail!("scheduler.interval_seconds must be greater than zero");
        }
        Ok(())
    }
}

impl DiscoveryConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            resolv_conf: ResolvConfConfig::default(),
            discovery: DiscoveryConfig::default(),
            probe: ProbeConfig::default(),
            selection: SelectionConfig::default(),
            scheduler: SchedulerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ResolvConfConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/etc/resolv.conf"),
            options: "timeout:1 attempts:1".to_string(),
            search: "localhost".to_string(),
            atomic_write: true,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:5353/nameservers".to_string(),
            fetch_timeout_ms: 2000,
            fallback_nameservers: "8.8.8.8,8.8.4.4,1.1.1.1".to_string(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            port: 53,
            failed_policy: FailedProbePolicy::Drop,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { max_nameservers: 3 }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: SocketAddr::from(([127, 0, 0, 1], 9153)),
        }
    }
}
