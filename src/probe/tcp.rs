use crate::{
    core::{ProbeResult, Prober},
    probe::ProbeError,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Measures TCP connect latency to a candidate.
#[derive(Debug, Clone)]
pub struct TcpProber {
    port: u16,
    timeout: Duration,
}

impl TcpProber {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, candidate: &str) -> ProbeResult {
        let start = Instant::now();
        // (&str, u16) accepts IPv4 and IPv6 literals as well as hostnames.
        let connect = TcpStream::connect((candidate, self.port));

        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(stream)) => {
                let latency = start.elapsed();
                drop(stream);
                metrics::counter!("nscheck_probes_total", "outcome" => "success").increment(1);
                metrics::histogram!("nscheck_probe_latency_seconds").record(latency.as_secs_f64());
                debug!(candidate, latency_ms = latency.as_millis() as u64, "Nameserver reachable.");
                ProbeResult::reachable(candidate, latency)
            }
            Ok(Err(e)) => {
                metrics::counter!("nscheck_probes_total", "outcome" => "failure").increment(1);
                warn!(candidate, port = self.port, error = %e, "Nameserver health check failed.");
                ProbeResult::failed(candidate, ProbeError::ConnectFailure(e.to_string()))
            }
            Err(_) => {
                metrics::counter!("nscheck_probes_total", "outcome" => "timeout").increment(1);
                warn!(candidate, port = self.port, timeout = ?self.timeout, "Nameserver health check timed out.");
                ProbeResult::failed(candidate, ProbeError::Timeout(self.timeout))
            }
        }
    }
}
