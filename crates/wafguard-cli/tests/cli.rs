use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn wafguard() -> Command {
    let mut cmd = Command::cargo_bin("wafguard").unwrap();
    for key in [
        "SCOPE",
        "IP_SET_NAME_BAD_BOTV4",
        "IP_SET_ID_BAD_BOTV4",
        "IP_SET_NAME_BAD_BOTV6",
        "IP_SET_ID_BAD_BOTV6",
        "IP_RETENTION_PERIOD_ALLOWED_MINUTE",
        "IP_RETENTION_PERIOD_DENIED_MINUTE",
        "TABLE_NAME",
        "WAFGUARD_STORE_URL",
        "WAFGUARD_CONFIG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_help() {
    wafguard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("retention"));
}

#[test]
fn test_config_from_env() {
    wafguard()
        .env("IP_RETENTION_PERIOD_DENIED_MINUTE", "5")
        .env("TABLE_NAME", "retention")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("15 min"))
        .stdout(predicate::str::contains("retention"));
}

#[test]
fn test_config_json_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "scope = \"CLOUDFRONT\"\n[retention]\ndenied_minutes = 60").unwrap();

    wafguard()
        .args(["--output", "json", "--config"])
        .arg(file.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"CLOUDFRONT\""))
        .stdout(predicate::str::contains("\"denied_minutes\": 60"));
}

#[test]
fn test_invalid_retention_env_fails() {
    wafguard()
        .env("IP_RETENTION_PERIOD_DENIED_MINUTE", "an hour")
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("IP_RETENTION_PERIOD_DENIED_MINUTE"));
}

#[test]
fn test_malformed_event_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    wafguard()
        .args(["retention", "--event"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed event"));
}

#[test]
fn test_retention_without_table_fails() {
    wafguard()
        .env("WAFGUARD_STORE_URL", "http://127.0.0.1:9")
        .args(["retention", "--event", "-"])
        .write_stdin(r#"{"detail": {"eventTime": "2024-01-01T00:00:00Z"}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no retention table configured"));
}

#[test]
fn test_event_read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"detail": {{"eventTime": "2024-01-01T00:00:00Z"}}}}"#).unwrap();

    wafguard()
        .env("WAFGUARD_STORE_URL", "http://127.0.0.1:9")
        .args(["retention", "--event"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no retention table configured"));
}
