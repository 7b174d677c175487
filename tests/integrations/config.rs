use nscheck::cli::Cli;
use nscheck::config::Config;
use nscheck::ranking::FailedProbePolicy;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn cli_with_file(toml_content: &str) -> (Cli, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    (cli, file)
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r#"
        log_level = "debug"
        [resolv_conf]
        path = "/run/nscheck/resolv.conf"
        options = "rotate"
        search = ""
        atomic_write = false
        [discovery]
        endpoint_url = "https://ns.example.com/nameservers"
        fetch_timeout_ms = 1500
        fallback_nameservers = "9.9.9.9"
        [probe]
        timeout_ms = 750
        port = 5353
        failed_policy = "trail"
        [selection]
        max_nameservers = 5
        [scheduler]
        interval_seconds = 10
        [metrics]
        enabled = true
        listen_address = "0.0.0.0:9100"
    "#;
    let (cli, _file) = cli_with_file(toml_content);

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.resolv_conf.path, PathBuf::from("/run/nscheck/resolv.conf"));
    assert_eq!(config.resolv_conf.options, "rotate");
    assert_eq!(config.resolv_conf.search, "");
    assert!(!config.resolv_conf.atomic_write);
    assert_eq!(config.discovery.endpoint_url, "https://ns.example.com/nameservers");
    assert_eq!(config.discovery.fetch_timeout_ms, 1500);
    assert_eq!(config.discovery.fallback_nameservers, "9.9.9.9");
    assert_eq!(config.probe.timeout_ms, 750);
    assert_eq!(config.probe.port, 5353);
    assert_eq!(config.probe.failed_policy, FailedProbePolicy::Trail);
    assert_eq!(config.selection.max_nameservers, 5);
    assert_eq!(config.scheduler.interval_seconds, 10);
    assert!(config.metrics.enabled);
    assert_eq!(config.metrics.listen_address.port(), 9100);
}

#[test]
#[serial]
fn test_load_default_values() {
    let (cli, _file) = cli_with_file("");
    let config = Config::load(&cli).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_partial_section_keeps_other_defaults() {
    let (cli, _file) = cli_with_file("[probe]\ntimeout_ms = 100\n");
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.probe.timeout_ms, 100);
    assert_eq!(config.probe.port, 53);
    assert_eq!(config.probe.failed_policy, FailedProbePolicy::Drop);
    assert_eq!(config.selection.max_nameservers, 3);
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let (mut cli, _file) = cli_with_file("[selection]\nmax_nameservers = 5\n[scheduler]\ninterval_seconds = 10\n");
    cli.max_nameservers = Some(1);
    cli.search = Some(String::new());
    cli.resolv_conf = Some(PathBuf::from("/tmp/resolv.test"));

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.selection.max_nameservers, 1);
    assert_eq!(config.scheduler.interval_seconds, 10);
    assert_eq!(config.resolv_conf.search, "");
    assert_eq!(config.resolv_conf.path, PathBuf::from("/tmp/resolv.test"));
}

#[test]
#[serial]
fn test_environment_overrides_file_but_not_cli() {
    let (mut cli, _file) = cli_with_file("[probe]\ntimeout_ms = 100\n[selection]\nmax_nameservers = 5\n");
    cli.max_nameservers = Some(2);

    std::env::set_var("NSCHECK_PROBE__TIMEOUT_MS", "250");
    std::env::set_var("NSCHECK_SELECTION__MAX_NAMESERVERS", "4");
    let config = Config::load(&cli);
    std::env::remove_var("NSCHECK_PROBE__TIMEOUT_MS");
    std::env::remove_var("NSCHECK_SELECTION__MAX_NAMESERVERS");

    let config = config.unwrap();
    assert_eq!(config.probe.timeout_ms, 250);
    assert_eq!(config.selection.max_nameservers, 2);
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let (cli, _file) = cli_with_file("[selection]\nmax_nameservers = \"three\"\n");
    assert!(Config::load(&cli).is_err());
}

#[test]
#[serial]
fn test_unknown_policy_is_rejected() {
    let cli = Cli {
        failed_policy: Some("shuffle".to_string()),
        ..Default::default()
    };
    assert!(Config::load(&cli).is_err());
}

#[test]
#[serial]
fn test_empty_fallback_is_rejected() {
    let cli = Cli {
        default_nameserver: Some(" , ".to_string()),
        ..Default::default()
    };
    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("fallback_nameservers"));
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    let cli = Cli {
        config: Some(PathBuf::from("/definitely/not/here/nscheck.toml")),
        ..Default::default()
    };
    assert!(Config::load(&cli).is_err());
}
