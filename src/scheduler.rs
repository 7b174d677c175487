//! The detection cycle and the loop that repeats it.
//!
//! One cycle walks `Collecting → Probing → Ranking → Writing`; the loop then
//! sleeps for the configured interval and starts over. Cycles are strictly
//! serialized and share no data except the state held by the sources.

use crate::{
    collector::NameserverCollector,
    core::{Candidate, CandidateSet, ProbeResult, Prober},
    probe::probe_all,
    ranking::{rank, select, FailedProbePolicy},
    resolv_conf::ResolvConfWriter,
};
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// The phase the scheduler is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Collecting,
    Probing,
    Ranking,
    Writing,
    Sleeping,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::Collecting => "collecting",
            CycleState::Probing => "probing",
            CycleState::Ranking => "ranking",
            CycleState::Writing => "writing",
            CycleState::Sleeping => "sleeping",
        };
        f.write_str(name)
    }
}

/// Tunables for the scheduler loop.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Upper bound on the number of nameservers written.
    pub max_nameservers: usize,
    pub failed_policy: FailedProbePolicy,
}

/// What happened to the resolver config during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Failed(String),
    /// The cycle ended before the writing phase.
    Skipped,
}

/// Everything a single cycle produced.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub candidates: CandidateSet,
    pub results: Vec<ProbeResult>,
    pub ranked: Vec<Candidate>,
    pub selection: Vec<Candidate>,
    pub write: WriteOutcome,
}

pub struct Scheduler {
    collector: NameserverCollector,
    prober: Arc<dyn Prober>,
    writer: ResolvConfWriter,
    settings: SchedulerSettings,
    state_tx: watch::Sender<CycleState>,
}

impl Scheduler {
    pub fn new(
        collector: NameserverCollector,
        prober: Arc<dyn Prober>,
        writer: ResolvConfWriter,
        settings: SchedulerSettings,
    ) -> Self {
        let (state_tx, _) = watch::channel(CycleState::Idle);
        Self {
            collector,
            prober,
            writer,
            settings,
            state_tx,
        }
    }

    /// Returns a receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> CycleState {
        *self.state_tx.borrow()
    }

    fn transition(&self, next: CycleState) {
        debug!(from = %self.state(), to = %next, "Scheduler state transition.");
        self.state_tx.send_replace(next);
    }

    /// Runs one full discover, probe, rank and write cycle.
    ///
    /// Never fails: source and write errors are logged and reflected in the
    /// returned report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        metrics::counter!("nscheck_cycles_total").increment(1);

        self.transition(CycleState::Collecting);
        let candidates = self.collector.collect().await;
        info!(candidates = ?candidates.to_vec(), "Collected nameserver candidates.");

        if candidates.is_empty() {
            error!(stage = "collecting", "No nameserver candidates available, skipping this cycle.");
            return CycleReport {
                candidates,
                results: Vec::new(),
                ranked: Vec::new(),
                selection: Vec::new(),
                write: WriteOutcome::Skipped,
            };
        }

        self.transition(CycleState::Probing);
        let results = probe_all(self.prober.clone(), &candidates).await;

        self.transition(CycleState::Ranking);
        let ranked = rank(&results, self.settings.failed_policy);
        let selection = select(&ranked, self.settings.max_nameservers);
        metrics::gauge!("nscheck_selected_nameservers").set(selection.len() as f64);
        if selection.is_empty() {
            warn!("No nameserver passed the health check, writing a config without nameserver lines.");
        }

        self.transition(CycleState::Writing);
        let write = self.write_selection(&selection).await;

        CycleReport {
            candidates,
            results,
            ranked,
            selection,
            write,
        }
    }

    async fn write_selection(&self, selection: &[Candidate]) -> WriteOutcome {
        let writer = self.writer.clone();
        let selection = selection.to_vec();
        match tokio::task::spawn_blocking(move || writer.write(&selection)).await {
            Ok(Ok(())) => {
                metrics::counter!("nscheck_resolv_conf_writes_total", "status" => "success").increment(1);
                WriteOutcome::Written
            }
            Ok(Err(e)) => {
                metrics::counter!("nscheck_resolv_conf_writes_total", "status" => "failure").increment(1);
                error!(stage = "writing", error = %e, "Failed to write resolver config.");
                WriteOutcome::Failed(e.to_string())
            }
            Err(e) => {
                metrics::counter!("nscheck_resolv_conf_writes_total", "status" => "failure").increment(1);
                error!(stage = "writing", error = %e, "Resolver config write task failed.");
                WriteOutcome::Failed(e.to_string())
            }
        }
    }

    /// Repeats cycles until `shutdown_rx` fires.
    ///
    /// A shutdown abandons the current cycle or sleep at its next await
    /// point. Probes already spawned run out on their own, bounded by the probe
    /// timeout, and their results are discarded.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            interval = ?self.settings.interval,
            max_nameservers = self.settings.max_nameservers,
            path = %self.writer.path().display(),
            "Scheduler started."
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Scheduler received shutdown signal during a cycle.");
                    break;
                }
                report = self.run_cycle() => {
                    debug!(results = ?report.results, "Probe results.");
                    info!(best = ?report.selection, "Nameserver detection completed.");
                }
            }

            self.transition(CycleState::Sleeping);
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("Scheduler received shutdown signal while sleeping.");
                    break;
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
        info!("Scheduler finished.");
    }
}
