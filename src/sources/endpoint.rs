//! Remote discovery endpoint client.
//!
//! The endpoint answers a plain GET with
//! `{"nameservers": [...], "endpointURL": "..."}`. A non-empty
//! `endpointURL` becomes the URL used on the following cycle.

use crate::{
    core::{Candidate, NameserverSource},
    sources::SourceError,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// The JSON document served by the discovery endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointResponse {
    #[serde(default)]
    pub nameservers: Option<Vec<Candidate>>,
    #[serde(default, rename = "endpointURL")]
    pub endpoint_url: Option<String>,
}

/// Fetches candidates from the remote endpoint and follows its redirections
/// across cycles.
#[derive(Debug, Clone)]
pub struct EndpointSource {
    client: Client,
    url: String,
}

impl EndpointSource {
    /// Creates a source for `url` whose requests are bounded by `fetch_timeout`.
    pub fn new(url: impl Into<String>, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The URL the next fetch will target.
    pub fn current_url(&self) -> &str {
        &self.url
    }

    async fn request(&self) -> Result<EndpointResponse, SourceError> {
        let unreachable = |e: reqwest::Error| SourceError::EndpointUnreachable {
            url: self.url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unreachable)?
            .error_for_status()
            .map_err(unreachable)?;
        let body = response.bytes().await.map_err(unreachable)?;

        serde_json::from_slice(&body).map_err(|e| SourceError::EndpointMalformed {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }

    /// Switches to `next` for subsequent cycles if it is a usable URL.
    fn adopt(&mut self, next: &str) {
        if next.is_empty() || next == self.url {
            return;
        }
        if !is_valid_endpoint_url(next) {
            warn!(current = %self.url, rejected = %next, "Ignoring malformed endpoint URL from discovery response.");
            return;
        }
        info!(previous = %self.url, next = %next, "Discovery endpoint redirected.");
        self.url = next.to_string();
    }
}

/// Returns `true` for absolute `http`/`https` URLs with a host.
pub fn is_valid_endpoint_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

#[async_trait]
impl NameserverSource for EndpointSource {
    fn name(&self) -> &str {
        "endpoint"
    }

    async fn fetch(&mut self) -> Result<Vec<Candidate>, SourceError> {
        let response = self.request().await?;
        if let Some(next) = response.endpoint_url.as_deref() {
            self.adopt(next);
        }
        Ok(response.nameservers.unwrap_or_default())
    }
}
