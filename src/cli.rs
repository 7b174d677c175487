//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments using `clap`. They take
//! precedence over the configuration file and environment variables, which
//! is achieved by implementing `figment::Provider` for `Cli`.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Keeps the system resolver list pointed at the fastest reachable nameservers.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the resolver configuration file to read and rewrite.
    #[arg(long, value_name = "FILE")]
    pub resolv_conf: Option<PathBuf>,

    /// URL of the remote nameserver discovery endpoint.
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Comma-separated fallback nameservers.
    #[arg(long, value_name = "LIST")]
    pub default_nameserver: Option<String>,

    /// Seconds to wait between detection rounds.
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Timeout for each nameserver connectivity check, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub ns_check_timeout: Option<u64>,

    /// Timeout for fetching the discovery endpoint, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub fetch_timeout: Option<u64>,

    /// Maximum number of nameservers to write back.
    #[arg(long, value_name = "N")]
    pub max_nameservers: Option<usize>,

    /// Value of the `options` line (empty to omit it).
    #[arg(long, value_name = "STRING")]
    pub options: Option<String>,

    /// Value of the `search` line (empty to omit it).
    #[arg(long, value_name = "STRING")]
    pub search: Option<String>,

    /// What to do with unreachable nameservers: "drop" or "trail".
    #[arg(long, value_name = "POLICY")]
    pub failed_policy: Option<String>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Inserts `value` at a dotted key path, creating intermediate dictionaries.
fn insert_path(dict: &mut Dict, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            dict.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = dict
                .entry(head.to_string())
                .or_insert_with(|| Value::Dict(Tag::Default, Dict::new()));
            if let Value::Dict(_, inner) = entry {
                insert_path(inner, rest, value);
            }
        }
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(path) = &self.resolv_conf {
            insert_path(
                &mut dict,
                "resolv_conf.path",
                Value::from(path.to_string_lossy().into_owned()),
            );
        }
        if let Some(options) = &self.options {
            insert_path(&mut dict, "resolv_conf.options", Value::from(options.clone()));
        }
        if let Some(search) = &self.search {
            insert_path(&mut dict, "resolv_conf.search", Value::from(search.clone()));
        }
        if let Some(url) = &self.endpoint_url {
            insert_path(&mut dict, "discovery.endpoint_url", Value::from(url.clone()));
        }
        if let Some(timeout) = self.fetch_timeout {
            insert_path(&mut dict, "discovery.fetch_timeout_ms", Value::from(timeout));
        }
        if let Some(list) = &self.default_nameserver {
            insert_path(
                &mut dict,
                "discovery.fallback_nameservers",
                Value::from(list.clone()),
            );
        }
        if let Some(timeout) = self.ns_check_timeout {
            insert_path(&mut dict, "probe.timeout_ms", Value::from(timeout));
        }
        if let Some(policy) = &self.failed_policy {
            insert_path(&mut dict, "probe.failed_policy", Value::from(policy.clone()));
        }
        if let Some(max) = self.max_nameservers {
            insert_path(&mut dict, "selection.max_nameservers", Value::from(max as u64));
        }
        if let Some(interval) = self.interval {
            insert_path(&mut dict, "scheduler.interval_seconds", Value::from(interval));
        }
        if let Some(level) = &self.log_level {
            insert_path(&mut dict, "log_level", Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
