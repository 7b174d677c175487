//! Prometheus exposition of a real detection cycle.

use nscheck::{
    collector::NameserverCollector,
    config::MetricsConfig,
    internal_metrics::MetricsBuilder,
    probe::TcpProber,
    ranking::FailedProbePolicy,
    resolv_conf::ResolvConfWriter,
    scheduler::{Scheduler, SchedulerSettings, WriteOutcome},
    sources::FallbackSource,
};
use std::{sync::Arc, time::Duration};
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::sync::watch;

#[path = "../helpers/mod.rs"]
mod helpers;

#[tokio::test]
async fn test_metrics_endpoint_exposes_cycle_series() {
    helpers::init_tracing();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let config = MetricsConfig {
        enabled: true,
        listen_address: "127.0.0.1:0".parse().unwrap(),
    };
    let (server, addr) = MetricsBuilder::new(config)
        .build(shutdown_rx)
        .expect("metrics should be enabled");
    let server_task = tokio::spawn(server.run());

    // 127.0.0.1 accepts the connect, 127.0.0.2 refuses it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let dir = tempdir().unwrap();
    let mut scheduler = Scheduler::new(
        NameserverCollector::new(vec![Box::new(FallbackSource::parse("127.0.0.1,127.0.0.2"))]),
        Arc::new(TcpProber::new(port, Duration::from_secs(2))),
        ResolvConfWriter::new(dir.path().join("resolv.conf"), "", "", true),
        SchedulerSettings {
            interval: Duration::from_secs(30),
            max_nameservers: 3,
            failed_policy: FailedProbePolicy::Drop,
        },
    );
    let report = scheduler.run_cycle().await;
    assert_eq!(report.selection, vec!["127.0.0.1"]);
    assert_eq!(report.write, WriteOutcome::Written);

    let body = reqwest::get(format!("http://{}/metrics", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("nscheck_cycles_total 1"), "{}", body);
    assert!(body.contains(r#"nscheck_probes_total{outcome="success"} 1"#), "{}", body);
    assert!(body.contains(r#"nscheck_probes_total{outcome="failure"} 1"#), "{}", body);
    assert!(body.contains(r#"nscheck_probe_latency_seconds_bucket{le="0.25"}"#), "{}", body);
    assert!(body.contains("nscheck_probe_latency_seconds_count 1"), "{}", body);
    assert!(body.contains("nscheck_selected_nameservers 1"), "{}", body);
    assert!(
        body.contains(r#"nscheck_resolv_conf_writes_total{status="success"} 1"#),
        "{}",
        body
    );

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("metrics server should stop on shutdown")
        .unwrap();
}
