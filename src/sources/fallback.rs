use crate::{
    core::{Candidate, NameserverSource},
    sources::SourceError,
};
use async_trait::async_trait;

/// The static, always-available list of fallback nameservers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackSource {
    nameservers: Vec<Candidate>,
}

impl FallbackSource {
    /// Parses a comma-separated list, trimming entries and dropping empty ones.
    pub fn parse(list: &str) -> Self {
        Self {
            nameservers: split_list(list),
        }
    }

    pub fn nameservers(&self) -> &[Candidate] {
        &self.nameservers
    }
}

/// Splits a comma-separated nameserver list.
pub fn split_list(list: &str) -> Vec<Candidate> {
    list.split(',')
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(String::from)
        .collect()
}

#[async_trait]
impl NameserverSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&mut self) -> Result<Vec<Candidate>, SourceError> {
        Ok(self.nameservers.clone())
    }
}
