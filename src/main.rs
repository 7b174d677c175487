//! nscheck - nameserver latency checker
//!
//! Periodically rewrites the resolver configuration with the fastest
//! reachable nameservers until SIGINT or SIGTERM is received.

use anyhow::Result;
use clap::Parser;
use nscheck::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            tracing_subscriber::fmt().init();
            error!("Failed to load configuration: {:#}", err);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("nscheck starting up...");
    info!("-------------------- Configuration --------------------");
    info!("Resolver Config: {}", config.resolv_conf.path.display());
    info!("Atomic Write: {}", config.resolv_conf.atomic_write);
    info!("Options: {:?}", config.resolv_conf.options);
    info!("Search: {:?}", config.resolv_conf.search);
    info!("Endpoint URL: {}", config.discovery.endpoint_url);
    info!("Fetch Timeout: {}ms", config.discovery.fetch_timeout_ms);
    info!("Fallback Nameservers: {}", config.discovery.fallback_nameservers);
    info!("Probe Timeout: {}ms", config.probe.timeout_ms);
    info!("Probe Port: {}", config.probe.port);
    info!("Failed Probe Policy: {}", config.probe.failed_policy);
    info!("Max Nameservers: {}", config.selection.max_nameservers);
    info!("Interval: {}s", config.scheduler.interval_seconds);
    info!(
        "Metrics: {}",
        if config.metrics.enabled {
            config.metrics.listen_address.to_string()
        } else {
            "Disabled".to_string()
        }
    );
    info!("-------------------------------------------------------");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let app = App::builder(config).build(shutdown_rx).await?;
    let app_task = tokio::spawn(app.run());

    wait_for_termination().await?;
    info!("Received termination signal. Exiting...");
    let _ = shutdown_tx.send(true);

    match app_task.await {
        Ok(result) => result?,
        Err(e) => error!("Application task panicked: {:?}", e),
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_termination() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_termination() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
