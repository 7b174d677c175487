//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A URL nothing listens on; connecting to it is refused immediately.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:1/nameservers";

/// Initializes a test-friendly tracing subscriber once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Writes a resolver config with the given content into `dir`.
pub fn write_resolv_conf(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("resolv.conf");
    std::fs::write(&path, content).expect("failed to write resolv.conf fixture");
    path
}

/// Reads back the `nameserver` addresses of a resolver config.
pub fn read_nameservers(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("resolv.conf should exist");
    nscheck::resolv_conf::parse_nameservers(std::io::BufReader::new(file))
        .expect("resolv.conf should be readable")
}

/// Mounts a discovery response on `route` and expects it to be hit `hits` times.
pub async fn mount_endpoint(
    server: &MockServer,
    route: &str,
    nameservers: &[&str],
    endpoint_url: &str,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nameservers": nameservers,
            "endpointURL": endpoint_url,
        })))
        .expect(hits)
        .mount(server)
        .await;
}
