//! # Internal Metrics Module
//!
//! Optional Prometheus exposition of the detection loop's metrics.
//!
//! - **`MetricsBuilder`**: installs the Prometheus recorder, registers the
//!   metric descriptions and binds the listener for the server.
//! - **`MetricsServer`**: (Defined in `server.rs`) an `axum` server that
//!   serves `/metrics`.
//!
//! Components record through the `metrics` macros at their call sites. When
//! no recorder is installed those calls are no-ops.

pub mod server;

use crate::config::MetricsConfig;
use crate::internal_metrics::server::MetricsServer;
use metrics::Unit;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::error;

/// Registers descriptions for every metric nscheck records.
pub fn describe_metrics() {
    metrics::describe_counter!("nscheck_cycles_total", Unit::Count, "Total number of detection cycles started.");
    metrics::describe_counter!("nscheck_source_failures_total", Unit::Count, "Total number of failed nameserver source queries, labeled by source.");
    metrics::describe_counter!("nscheck_probes_total", Unit::Count, "Total number of nameserver probes, labeled by outcome.");
    metrics::describe_histogram!("nscheck_probe_latency_seconds", Unit::Seconds, "TCP connect latency of reachable nameservers.");
    metrics::describe_gauge!("nscheck_selected_nameservers", Unit::Count, "Number of nameservers selected in the last cycle.");
    metrics::describe_counter!("nscheck_resolv_conf_writes_total", Unit::Count, "Total number of resolver config writes, labeled by status.");
}

/// Builder for the metrics system.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the global recorder and returns the server to spawn together
    /// with its bound address.
    ///
    /// Returns `None` when metrics are disabled or any step fails; failures
    /// are logged and never abort startup.
    pub fn build(self, shutdown_rx: watch::Receiver<bool>) -> Option<(MetricsServer, SocketAddr)> {
        if !self.config.enabled {
            return None;
        }

        let builder = match PrometheusBuilder::new().set_buckets_for_metric(
            Matcher::Full("nscheck_probe_latency_seconds".to_string()),
            &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        ) {
            Ok(builder) => builder,
            Err(e) => {
                error!("Failed to configure Prometheus buckets: {}", e);
                return None;
            }
        };
        let recorder = builder.build_recorder();
        let handle = recorder.handle();

        let listener = match std::net::TcpListener::bind(self.config.listen_address) {
            Ok(listener) => listener,
            Err(e) => {
                error!(
                    "Failed to bind metrics server to {}: {}",
                    self.config.listen_address, e
                );
                return None;
            }
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("Failed to get local address for metrics server: {}", e);
                return None;
            }
        };
        let listener = match listener
            .set_nonblocking(true)
            .and_then(|_| TcpListener::from_std(listener))
        {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to hand metrics listener to tokio: {}", e);
                return None;
            }
        };

        if let Err(e) = metrics::set_global_recorder(recorder) {
            error!("Failed to install Prometheus recorder: {}", e);
            return None;
        }
        describe_metrics();

        Some((MetricsServer::new(listener, handle, shutdown_rx), addr))
    }
}
