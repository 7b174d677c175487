//! Concurrent reachability probing.
//!
//! A probe is a bare TCP connect to `<candidate>:<port>`; no DNS traffic is
//! exchanged. All candidates are probed in parallel and the join waits for
//! every probe, so a cycle's probing phase lasts about as long as the
//! slowest probe, which is bounded by the probe timeout.

pub mod tcp;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use tcp::TcpProber;

use crate::core::{CandidateSet, ProbeResult, Prober};
use futures::future::join_all;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, error};

/// Why a candidate could not be reached. Recorded in the probe result, never
/// propagated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    #[error("connect failed: {0}")]
    ConnectFailure(String),
}

/// Probes every candidate concurrently and returns one result per candidate,
/// in the set's iteration order.
///
/// Each probe runs in its own task. Does not return until every probe has
/// reported; a probe task that panics is recorded as a connect failure.
pub async fn probe_all(prober: Arc<dyn Prober>, candidates: &CandidateSet) -> Vec<ProbeResult> {
    let candidates = candidates.to_vec();
    let handles: Vec<_> = candidates
        .iter()
        .cloned()
        .map(|candidate| {
            let prober = prober.clone();
            tokio::spawn(async move { prober.probe(&candidate).await })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .zip(candidates)
        .map(|(joined, candidate)| match joined {
            Ok(result) => {
                debug!(candidate = %result.candidate, outcome = ?result.outcome, "Probe finished.");
                result
            }
            Err(e) => {
                error!(candidate = %candidate, error = %e, "Probe task failed.");
                ProbeResult::failed(candidate, ProbeError::ConnectFailure(format!("probe task failed: {}", e)))
            }
        })
        .collect()
}
