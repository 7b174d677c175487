//! The main application logic, decoupled from the entry point.

use crate::{
    collector::NameserverCollector,
    config::Config,
    core::{NameserverSource, Prober},
    internal_metrics::MetricsBuilder,
    probe::TcpProber,
    resolv_conf::ResolvConfWriter,
    scheduler::{CycleState, Scheduler, SchedulerSettings},
    sources::{EndpointSource, FallbackSource, LocalFileSource},
    task_manager::TaskManager,
};
use anyhow::{Context, Result};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{info, instrument};

/// A handle to the running application.
pub struct App {
    task_manager: TaskManager,
    metrics_addr: Option<SocketAddr>,
    state_rx: watch::Receiver<CycleState>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_addr
    }

    /// Observes the scheduler's state transitions.
    pub fn state(&self) -> watch::Receiver<CycleState> {
        self.state_rx.clone()
    }

    /// Waits for the shutdown signal and then for every task to stop.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.task_manager.get_shutdown_rx();
        shutdown_rx.changed().await.ok();
        info!("Shutdown signal received. Waiting for tasks to complete...");

        self.task_manager.shutdown().await;
        Ok(())
    }
}

/// Builder for the main application.
///
/// Separates constructing the components from running them, and lets tests
/// swap out the network-facing pieces.
pub struct AppBuilder {
    config: Config,
    sources_override: Option<Vec<Box<dyn NameserverSource>>>,
    prober_override: Option<Arc<dyn Prober>>,
    interval_override: Option<Duration>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sources_override: None,
            prober_override: None,
            interval_override: None,
        }
    }

    /// Replaces the default local file, endpoint and fallback sources.
    pub fn sources_override(mut self, sources: Vec<Box<dyn NameserverSource>>) -> Self {
        self.sources_override = Some(sources);
        self
    }

    /// Replaces the TCP prober.
    pub fn prober_override(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober_override = Some(prober);
        self
    }

    /// Uses a sub-second cycle interval, which the config cannot express.
    pub fn interval_override(mut self, interval: Duration) -> Self {
        self.interval_override = Some(interval);
        self
    }

    /// Builds every component and spawns the scheduler.
    #[instrument(skip_all)]
    pub async fn build(self, shutdown_rx: watch::Receiver<bool>) -> Result<App> {
        let config = self.config;
        let task_manager = TaskManager::new(shutdown_rx);

        // Metrics
        let metrics_addr = match MetricsBuilder::new(config.metrics.clone())
            .build(task_manager.get_shutdown_rx())
        {
            Some((server, addr)) => {
                info!("Metrics server listening on http://{}/metrics", addr);
                task_manager.spawn("MetricsServer", server.run());
                Some(addr)
            }
            None => None,
        };

        // Sources, in priority order
        let sources = match self.sources_override {
            Some(sources) => sources,
            None => {
                let endpoint = EndpointSource::new(
                    config.discovery.endpoint_url.clone(),
                    config.discovery.fetch_timeout(),
                )
                .context("failed to build the discovery HTTP client")?;
                let sources: Vec<Box<dyn NameserverSource>> = vec![
                    Box::new(LocalFileSource::new(config.resolv_conf.path.clone())),
                    Box::new(endpoint),
                    Box::new(FallbackSource::parse(&config.discovery.fallback_nameservers)),
                ];
                sources
            }
        };

        let prober = match self.prober_override {
            Some(prober) => prober,
            None => Arc::new(TcpProber::new(config.probe.port, config.probe.timeout())),
        };

        let writer = ResolvConfWriter::new(
            config.resolv_conf.path.clone(),
            config.resolv_conf.options.clone(),
            config.resolv_conf.search.clone(),
            config.resolv_conf.atomic_write,
        );

        let settings = SchedulerSettings {
            interval: self
                .interval_override
                .unwrap_or_else(|| config.scheduler.interval()),
            max_nameservers: config.selection.max_nameservers,
            failed_policy: config.probe.failed_policy,
        };

        let scheduler = Scheduler::new(NameserverCollector::new(sources), prober, writer, settings);
        let state_rx = scheduler.subscribe();
        task_manager.spawn("Scheduler", scheduler.run(task_manager.get_shutdown_rx()));

        Ok(App {
            task_manager,
            metrics_addr,
            state_rx,
        })
    }
}
