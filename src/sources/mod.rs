//! Nameserver sources.
//!
//! Each source yields a list of candidate addresses and is queried once per
//! cycle. Failures are reported as [`SourceError`] and never abort a cycle.

pub mod endpoint;
pub mod fallback;
pub mod local;

pub use endpoint::EndpointSource;
pub use fallback::FallbackSource;
pub use local::LocalFileSource;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot open resolver config {path}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error while scanning resolver config {path}: {source}")]
    ConfigScanError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("endpoint {url} unreachable: {reason}")]
    EndpointUnreachable { url: String, reason: String },

    #[error("endpoint {url} returned a malformed body: {reason}")]
    EndpointMalformed { url: String, reason: String },
}
