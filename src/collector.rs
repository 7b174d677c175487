//! Builds the candidate set for a cycle from all configured sources.

use crate::core::{Candidate, CandidateSet, NameserverSource};
use tracing::{info, warn};

/// Unions candidate lists into a deduplicated set.
pub fn build_candidate_set<I>(inputs: I) -> CandidateSet
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    inputs.into_iter().flatten().collect()
}

/// Queries every source in priority order and pools the results.
///
/// Priority only decides the order in which sources are queried and logged;
/// it has no influence on ranking.
pub struct NameserverCollector {
    sources: Vec<Box<dyn NameserverSource>>,
}

impl NameserverCollector {
    pub fn new(sources: Vec<Box<dyn NameserverSource>>) -> Self {
        Self { sources }
    }

    /// Collects a fresh candidate set. A failing source contributes nothing.
    pub async fn collect(&mut self) -> CandidateSet {
        let mut lists = Vec::with_capacity(self.sources.len());
        for source in self.sources.iter_mut() {
            match source.fetch().await {
                Ok(nameservers) if !nameservers.is_empty() => {
                    info!(source = source.name(), nameservers = ?nameservers, "Collected nameservers.");
                    lists.push(nameservers);
                }
                Ok(_) => {
                    warn!(source = source.name(), "Source returned no nameservers.");
                }
                Err(e) => {
                    metrics::counter!("nscheck_source_failures_total", "source" => source.name().to_string())
                        .increment(1);
                    warn!(source = source.name(), error = %e, "Failed to collect nameservers.");
                }
            }
        }
        build_candidate_set(lists)
    }
}
