//! Deterministic prober for tests.

use crate::{
    core::{ProbeResult, Prober},
    probe::ProbeError,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

#[derive(Debug, Clone, Copy)]
enum FakeOutcome {
    Reachable(Duration),
    TimedOut(Duration),
}

/// A prober that answers from a fixed table instead of the network.
///
/// Candidates without an entry fail with a connect error.
#[derive(Debug, Default)]
pub struct FakeProber {
    outcomes: Mutex<HashMap<String, FakeOutcome>>,
    call_count: Mutex<HashMap<String, u32>>,
    delay: Duration,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every probe sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reports `candidate` as reachable after `latency_ms`.
    pub fn set_reachable(&self, candidate: &str, latency_ms: u64) {
        self.outcomes.lock().unwrap().insert(
            candidate.to_string(),
            FakeOutcome::Reachable(Duration::from_millis(latency_ms)),
        );
    }

    /// Reports `candidate` as timing out after `timeout`.
    pub fn set_timeout(&self, candidate: &str, timeout: Duration) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(candidate.to_string(), FakeOutcome::TimedOut(timeout));
    }

    /// The number of times `candidate` was probed.
    pub fn get_call_count(&self, candidate: &str) -> u32 {
        self.call_count
            .lock()
            .unwrap()
            .get(candidate)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, candidate: &str) -> ProbeResult {
        {
            let mut call_count = self.call_count.lock().unwrap();
            *call_count.entry(candidate.to_string()).or_insert(0) += 1;
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let entry = self.outcomes.lock().unwrap().get(candidate).copied();
        match entry {
            Some(FakeOutcome::Reachable(latency)) => ProbeResult::reachable(candidate, latency),
            Some(FakeOutcome::TimedOut(timeout)) => {
                ProbeResult::failed(candidate, ProbeError::Timeout(timeout))
            }
            None => ProbeResult::failed(
                candidate,
                ProbeError::ConnectFailure("connection refused".to_string()),
            ),
        }
    }
}
