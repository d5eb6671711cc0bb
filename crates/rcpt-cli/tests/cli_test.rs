use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn rcpt() -> Command {
    let mut cmd = Command::cargo_bin("rcpt").unwrap();
    // Keep the user's own config file out of the picture.
    cmd.env("XDG_CONFIG_HOME", std::env::temp_dir().join("rcpt-cli-test-config"));
    cmd
}

#[test]
fn test_extract_summarizes_response() {
    rcpt()
        .arg("extract")
        .arg(fixture("expense_response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Vendor": "Blue Bottle Cafe""#))
        .stdout(predicate::str::contains(r#""Total": "$14.50""#))
        .stdout(predicate::str::contains(r#""Date": "12/03/2024""#))
        .stdout(predicate::str::contains("ITEM: Latte | PRICE: 5.50"))
        .stdout(predicate::str::contains(r#""Source": "expense_response.json""#));
}

#[test]
fn test_extract_with_source() {
    rcpt()
        .args(["extract", "--source", "lunch.jpg"])
        .arg(fixture("expense_response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Source": "lunch.jpg""#));
}

#[test]
fn test_extract_rejects_invalid_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.json");
    fs::write(&input, "{not json").unwrap();

    rcpt()
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid JSON"));
}

#[test]
fn test_prompt_renders_summary() {
    rcpt()
        .arg("prompt")
        .arg(fixture("summary.json"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Human: "))
        .stdout(predicate::str::contains("Vendor: Acme\nTotal: $10.00\nDate: 2024-01-01\nItems:\n- Coffee"))
        .stdout(predicate::str::contains("===JSON==="));
}

#[test]
fn test_parse_without_summary() {
    rcpt()
        .arg("parse")
        .arg(fixture("model_response.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""summary_line": "Coffee purchase at Acme for $10.00.""#,
        ))
        .stdout(predicate::str::contains(r#""category": "Dining""#))
        .stdout(predicate::str::contains(r#""amount": null"#));
}

#[test]
fn test_parse_normalizes_against_summary() {
    rcpt()
        .arg("parse")
        .arg(fixture("model_response.json"))
        .arg("--summary")
        .arg(fixture("summary.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""amount": 10.0"#))
        .stdout(predicate::str::contains(r#""currency": "USD""#));
}

#[test]
fn test_parse_plain_text() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("out.txt");
    fs::write(&input, "  Just a sentence.  ").unwrap();

    rcpt()
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""summary_line": "Just a sentence.""#))
        .stdout(predicate::str::contains(r#""fields": {}"#));
}

#[test]
fn test_handle_skips_foreign_key() {
    let dir = TempDir::new().unwrap();

    rcpt()
        .args(["handle", "--stage", "model", "--root"])
        .arg(dir.path())
        .arg(fixture("skip_event.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""statusCode": 200"#))
        .stdout(predicate::str::contains(r#""body": "skipped""#));
}

#[test]
fn test_handle_ocr_requires_analyzer() {
    let dir = TempDir::new().unwrap();

    rcpt()
        .args(["handle", "--stage", "ocr", "--root"])
        .arg(dir.path())
        .arg(fixture("skip_event.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("analyzer.endpoint is not set"));
}

#[test]
fn test_handle_malformed_event() {
    let dir = TempDir::new().unwrap();
    let event = dir.path().join("event.json");
    fs::write(&event, r#"{"Records": []}"#).unwrap();

    rcpt()
        .args(["handle", "--stage", "model", "--root"])
        .arg(dir.path())
        .arg(&event)
        .assert()
        .failure()
        .stderr(predicate::str::contains("event has no records"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let path_arg = path.to_str().unwrap();

    rcpt()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(path.exists());

    rcpt()
        .args(["--config", path_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    rcpt()
        .args(["--config", path_arg, "config", "set", "model.max_output_tokens", "800"])
        .assert()
        .success();

    rcpt()
        .args(["--config", path_arg, "config", "get", "model.max_output_tokens"])
        .assert()
        .success()
        .stdout(predicate::str::diff("800\n"));

    rcpt()
        .args(["--config", path_arg, "config", "get", "model.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_set_rejects_wrong_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    rcpt()
        .args(["--config", path.to_str().unwrap(), "config", "set", "model.temperature", "warm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for model.temperature"));
    assert!(!path.exists());
}
