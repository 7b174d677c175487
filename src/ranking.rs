//! Ranking probe results and selecting the nameservers to write.

use crate::core::{Candidate, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with candidates whose probe failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailedProbePolicy {
    /// Exclude failed candidates from the ranking entirely.
    #[default]
    Drop,
    /// Keep failed candidates after every reachable one.
    Trail,
}

impl fmt::Display for FailedProbePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedProbePolicy::Drop => write!(f, "drop"),
            FailedProbePolicy::Trail => write!(f, "trail"),
        }
    }
}

/// Orders candidates by ascending latency.
///
/// The sort is stable, so equal latencies keep their input order. Failed
/// probes are dropped or appended in input order depending on `policy`.
pub fn rank(results: &[ProbeResult], policy: FailedProbePolicy) -> Vec<Candidate> {
    let mut reachable: Vec<_> = results
        .iter()
        .filter_map(|r| r.latency().map(|latency| (latency, &r.candidate)))
        .collect();
    reachable.sort_by_key(|(latency, _)| *latency);

    let mut ranked: Vec<Candidate> = reachable.into_iter().map(|(_, c)| c.clone()).collect();
    if policy == FailedProbePolicy::Trail {
        ranked.extend(
            results
                .iter()
                .filter(|r| !r.is_reachable())
                .map(|r| r.candidate.clone()),
        );
    }
    ranked
}

/// Keeps at most `max` entries from the front of `ranked`.
pub fn select(ranked: &[Candidate], max: usize) -> Vec<Candidate> {
    ranked.iter().take(max).cloned().collect()
}
