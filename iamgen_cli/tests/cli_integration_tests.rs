// CLI integration tests for iamgen
//
// These run the built binary against fixture files in a temp directory
// and check the emitted policy records.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const APPS: &str = r#"
payments:
  - billing
  - scheduled-reconcile
"#;

const RESOURCE_USAGE: &str = r#"
resources:
  buckets:
    payments: [invoices]
  queues:
    payments: [ledger-events]
permissions:
  buckets:
    read: [roles/storage.objectViewer]
  queues.topics:
    publish: [roles/pubsub.publisher]
  queues.subscriptions:
    subscribe: [roles/pubsub.subscriber]
usage:
  billing:
    buckets:
      read: [invoices]
    queues:
      publish: [ledger-events]
  scheduled-reconcile:
    queues:
      subscribe: [ledger-events]
"#;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("iamgen").unwrap();
    cmd.env_remove("LOG_LEVEL");
    cmd
}

fn fixtures(usage: &str) -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let apps = dir.path().join("apps.yaml");
    let usage_path = dir.path().join("resource-usage.yaml");
    fs::write(&apps, APPS).unwrap();
    fs::write(&usage_path, usage).unwrap();
    (dir, apps, usage_path)
}

fn with_inputs<'a>(cmd: &'a mut Command, apps: &Path, usage: &Path) -> &'a mut Command {
    cmd.arg("--apps-file")
        .arg(apps)
        .arg("--usage-file")
        .arg(usage)
        .arg("--locator")
        .arg("unit=pay")
}

fn parse_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_writes_json_lines_to_stdout() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    let output = with_inputs(&mut cmd(), &apps, &usage)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let records = parse_lines(&output);
    let resources: Vec<&str> = records
        .iter()
        .map(|r| r["resource"].as_str().unwrap())
        .collect();
    assert_eq!(
        resources,
        vec![
            "projects/_/buckets/yoyodyne-invoices-dev-usce1gcp",
            "projects/iam-shr-dev-pay/serviceAccounts/billing-sa@iam-shr-dev-pay.iam.gserviceaccount.com",
            "projects/iam-shr-dev-pay/serviceAccounts/s-reconcile-sa@iam-shr-dev-pay.iam.gserviceaccount.com",
            "projects/payments-dev-pay/subscriptions/ledger-events.dev.usce1gcp",
            "projects/payments-dev-pay/topics/ledger-events.dev.usce1gcp",
        ]
    );
}

#[test]
fn test_output_file_and_pretty() {
    let (dir, apps, usage) = fixtures(RESOURCE_USAGE);
    let out = dir.path().join("policies.json");

    with_inputs(&mut cmd(), &apps, &usage)
        .arg("--output-file")
        .arg(&out)
        .arg("--pretty")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("\n  \"resource\""));
    assert!(written.contains("serviceAccount:billing-sa@iam-shr-dev-pay.iam.gserviceaccount.com"));
}

#[test]
fn test_stage_flag() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    with_inputs(&mut cmd(), &apps, &usage)
        .args(["--stage", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "projects/_/buckets/yoyodyne-invoices-prod-usce1gcp",
        ))
        .stdout(predicate::str::contains("iam-shr-prod-pay"));
}

#[test]
fn test_unsupported_stage_fails() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    with_inputs(&mut cmd(), &apps, &usage)
        .args(["--stage", "qa"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("qa"));
}

#[test]
fn test_unsupported_region_fails() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    with_inputs(&mut cmd(), &apps, &usage)
        .args(["--region", "mars1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("region mars1 not supported"));
}

#[test]
fn test_malformed_locator_fails() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    with_inputs(&mut cmd(), &apps, &usage)
        .args(["--locator", "company"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn test_missing_unit_fails() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    cmd()
        .arg("--apps-file")
        .arg(&apps)
        .arg("--usage-file")
        .arg(&usage)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unit"));
}

#[test]
fn test_missing_input_file_fails() {
    let (dir, apps, _usage) = fixtures(RESOURCE_USAGE);
    let missing = dir.path().join("nope.yaml");
    with_inputs(&mut cmd(), &apps, &missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_locators_file_overridden_by_flag() {
    let (dir, apps, usage) = fixtures(RESOURCE_USAGE);
    let locators = dir.path().join("locators.toml");
    fs::write(&locators, "company = \"initech\"\nunit = \"ignored\"\n").unwrap();

    with_inputs(&mut cmd(), &apps, &usage)
        .arg("--locators-file")
        .arg(&locators)
        .assert()
        .success()
        .stdout(predicate::str::contains("initech-invoices-dev-usce1gcp"))
        .stdout(predicate::str::contains("iam-shr-dev-pay"))
        .stdout(predicate::str::contains("ignored").not());
}

#[test]
fn test_unknown_operation_is_soft_by_default() {
    let usage = RESOURCE_USAGE.replace("read: [invoices]", "destroy: [invoices]");
    let (_dir, apps, usage) = fixtures(&usage);

    with_inputs(&mut cmd(), &apps, &usage)
        .assert()
        .success()
        .stdout(predicate::str::contains("buckets/").not())
        .stderr(predicate::str::contains("destroy"));
}

#[test]
fn test_strict_mode_fails_on_diagnostics() {
    let usage = RESOURCE_USAGE.replace("read: [invoices]", "destroy: [invoices]");
    let (dir, apps, usage) = fixtures(&usage);
    let out = dir.path().join("policies.json");

    with_inputs(&mut cmd(), &apps, &usage)
        .arg("--strict")
        .arg("--output-file")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("strict mode"));

    assert!(!out.exists());
}

#[test]
fn test_strict_mode_passes_clean_input() {
    let (_dir, apps, usage) = fixtures(RESOURCE_USAGE);
    with_inputs(&mut cmd(), &apps, &usage)
        .arg("--strict")
        .assert()
        .success();
}
