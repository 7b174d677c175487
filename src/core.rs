//! Core domain types and service traits for nscheck
//!
//! This module defines the values that flow through one detection cycle and
//! the trait contracts the scheduler uses to talk to its collaborators.

use crate::{probe::ProbeError, sources::SourceError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;

/// A resolver address such as `"8.8.8.8"`.
///
/// The port is implicit. Identity is the exact string: no normalization is
/// applied, so `"8.8.8.8"` and `"008.8.8.8"` are different candidates.
pub type Candidate = String;

/// The deduplicated set of candidates gathered for a single cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    inner: BTreeSet<Candidate>,
}

impl CandidateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every candidate from `candidates`, collapsing exact duplicates.
    pub fn extend<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.inner.extend(candidates);
    }

    /// Returns `true` if `candidate` is a member of the set.
    pub fn contains(&self, candidate: &str) -> bool {
        self.inner.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the members in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.inner.iter()
    }

    /// Returns the members as a vector, in iteration order.
    pub fn to_vec(&self) -> Vec<Candidate> {
        self.inner.iter().cloned().collect()
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// The outcome of probing a single candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The TCP connection was established after `latency`.
    Reachable { latency: Duration },
    /// The connection failed or timed out.
    Failed(ProbeError),
}

/// A candidate together with its probe outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub candidate: Candidate,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    /// Creates a successful result.
    pub fn reachable(candidate: impl Into<Candidate>, latency: Duration) -> Self {
        Self {
            candidate: candidate.into(),
            outcome: ProbeOutcome::Reachable { latency },
        }
    }

    /// Creates a failed result.
    pub fn failed(candidate: impl Into<Candidate>, error: ProbeError) -> Self {
        Self {
            candidate: candidate.into(),
            outcome: ProbeOutcome::Failed(error),
        }
    }

    /// The measured latency, or `None` for a failed probe.
    pub fn latency(&self) -> Option<Duration> {
        match &self.outcome {
            ProbeOutcome::Reachable { latency } => Some(*latency),
            ProbeOutcome::Failed(_) => None,
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Reachable { .. })
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Produces nameserver candidates for a cycle.
#[async_trait]
pub trait NameserverSource: Send + Sync {
    /// A short name used in logs and metric labels (e.g. "resolv_conf").
    fn name(&self) -> &str;

    /// Fetches the current list of candidates.
    ///
    /// Takes `&mut self` because a source may carry state from one cycle to
    /// the next (the remote endpoint can redirect itself).
    async fn fetch(&mut self) -> Result<Vec<Candidate>, SourceError>;
}

/// Measures how quickly a candidate accepts a connection.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes `candidate` once. Failures are reported inside the returned
    /// `ProbeResult`, never as an error.
    async fn probe(&self, candidate: &str) -> ProbeResult;
}
