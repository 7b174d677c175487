//! Source readers against real files and a mock discovery endpoint.

use nscheck::{
    collector::NameserverCollector,
    core::NameserverSource,
    sources::{EndpointSource, FallbackSource, LocalFileSource, SourceError},
};
use std::time::Duration;
use tempfile::tempdir;
use wiremock::MockServer;

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::{mount_endpoint, write_resolv_conf, UNREACHABLE_ENDPOINT};

#[tokio::test]
async fn test_local_file_with_real_world_layout() {
    let dir = tempdir().unwrap();
    let path = write_resolv_conf(
        dir.path(),
        "# Generated by NetworkManager\nsearch lan\nnameserver 192.168.1.1\nnameserver fe80::1%eth0\noptions edns0 trust-ad\n",
    );

    let mut source = LocalFileSource::new(&path);
    assert_eq!(source.name(), "resolv_conf");
    assert_eq!(
        source.fetch().await.unwrap(),
        vec!["192.168.1.1", "fe80::1%eth0"]
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_keeps_its_url() {
    let mut source = EndpointSource::new(UNREACHABLE_ENDPOINT, Duration::from_millis(500)).unwrap();
    let err = source.fetch().await.unwrap_err();

    assert!(matches!(err, SourceError::EndpointUnreachable { .. }));
    assert_eq!(source.current_url(), UNREACHABLE_ENDPOINT);
}

#[tokio::test]
async fn test_redirect_chain_is_followed_one_hop_per_fetch() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    let third = MockServer::start().await;

    let second_url = format!("{}/b", second.uri());
    let third_url = format!("{}/c", third.uri());
    mount_endpoint(&first, "/a", &["1.1.1.1"], &second_url, 1).await;
    mount_endpoint(&second, "/b", &["8.8.8.8"], &third_url, 1).await;
    mount_endpoint(&third, "/c", &["9.9.9.9"], "", 2).await;

    let mut source =
        EndpointSource::new(format!("{}/a", first.uri()), Duration::from_secs(2)).unwrap();

    assert_eq!(source.fetch().await.unwrap(), vec!["1.1.1.1"]);
    assert_eq!(source.current_url(), second_url);
    assert_eq!(source.fetch().await.unwrap(), vec!["8.8.8.8"]);
    assert_eq!(source.current_url(), third_url);
    assert_eq!(source.fetch().await.unwrap(), vec!["9.9.9.9"]);
    assert_eq!(source.fetch().await.unwrap(), vec!["9.9.9.9"]);
    assert_eq!(source.current_url(), third_url);
}

#[tokio::test]
async fn test_collector_pools_every_source() {
    let server = MockServer::start().await;
    mount_endpoint(&server, "/nameservers", &["1.1.1.1", "9.9.9.9"], "", 1).await;

    let dir = tempdir().unwrap();
    let path = write_resolv_conf(dir.path(), "nameserver 9.9.9.9\nnameserver 192.168.1.1\n");

    let mut collector = NameserverCollector::new(vec![
        Box::new(LocalFileSource::new(&path)),
        Box::new(
            EndpointSource::new(format!("{}/nameservers", server.uri()), Duration::from_secs(2))
                .unwrap(),
        ),
        Box::new(FallbackSource::parse("8.8.8.8, 1.1.1.1")),
    ]);

    let set = collector.collect().await;
    assert_eq!(
        set.to_vec(),
        vec!["1.1.1.1", "192.168.1.1", "8.8.8.8", "9.9.9.9"]
    );
}
