use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("nscheck")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--resolv-conf"))
        .stdout(predicate::str::contains("--max-nameservers"))
        .stdout(predicate::str::contains("--ns-check-timeout"));
}

#[test]
fn test_invalid_configuration_exits_with_error() {
    Command::cargo_bin("nscheck")
        .unwrap()
        .args(["--default-nameserver", " , "])
        .env_remove("RUST_LOG")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    Command::cargo_bin("nscheck")
        .unwrap()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--no-such-flag"));
}
