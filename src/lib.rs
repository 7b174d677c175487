//! nscheck - keeps a host's resolver list pointed at the fastest reachable
//! nameservers.
//!
//! Every cycle gathers candidates from the local resolver configuration, a
//! remote discovery endpoint and a static fallback list, probes them all
//! concurrently with a TCP connect, ranks the reachable ones by latency and
//! rewrites the resolver configuration with the best of them.

pub mod app;
pub mod cli;
pub mod collector;
pub mod config;
pub mod core;
pub mod internal_metrics;
pub mod probe;
pub mod ranking;
pub mod resolv_conf;
pub mod scheduler;
pub mod sources;
pub mod task_manager;

// Re-export core types for convenience
pub use crate::core::*;
