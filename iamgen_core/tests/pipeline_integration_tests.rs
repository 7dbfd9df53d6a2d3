use iamgen_core::{
    compile, compile_files, input, write_policies, LocatorSet, OutputFormat, ResourcePolicyMap,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;

const APPS: &str = r#"
ns1:
  - billing
"#;

const RESOURCE_USAGE: &str = r#"
resources:
  buckets:
    own1: [invoices]
  queues:
    own2: [events]
permissions:
  buckets:
    read: [roles/storage.objectViewer, roles/storage.legacyBucketReader]
    write: [roles/storage.objectCreator]
  queues.topics:
    publish: [roles/pubsub.publisher]
  queues.subscriptions:
    subscribe: [roles/pubsub.subscriber]
usage:
  billing:
    buckets:
      read: [invoices]
"#;

const BILLING_GSA: &str = "billing-sa@iam-shr-dev-x.iam.gserviceaccount.com";

fn locators() -> LocatorSet {
    LocatorSet::builder()
        .company("acme")
        .provider("gcp")
        .region("usce1")
        .stage("dev")
        .binding("unit", "x")
        .build()
        .unwrap()
}

fn render(policies: &ResourcePolicyMap) -> Vec<Value> {
    let mut out = Vec::new();
    write_policies(&mut out, policies, OutputFormat::Compact).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_bucket_read_scenario() {
    let apps = input::apps_from_str(APPS).unwrap();
    let usage = input::resource_usage_from_str(RESOURCE_USAGE).unwrap();

    let compilation = compile(&apps, &usage, &locators()).unwrap();
    assert!(compilation.diagnostics.is_empty());

    let records = render(&compilation.policies);
    assert_eq!(
        records,
        vec![
            json!({
                "resource": "projects/_/buckets/acme-invoices-dev-usce1gcp",
                "bindings": [
                    {
                        "role": "roles/storage.legacyBucketReader",
                        "members": [format!("serviceAccount:{}", BILLING_GSA)],
                    },
                    {
                        "role": "roles/storage.objectViewer",
                        "members": [format!("serviceAccount:{}", BILLING_GSA)],
                    },
                ]
            }),
            json!({
                "resource": format!("projects/iam-shr-dev-x/serviceAccounts/{}", BILLING_GSA),
                "bindings": [
                    {
                        "role": "roles/iam.serviceAccountTokenCreator",
                        "members": [format!("serviceAccount:{}", BILLING_GSA)],
                    },
                    {
                        "role": "roles/iam.workloadIdentityUser",
                        "members": ["serviceAccount:gke-shr-dev-x.svc.id.goog[ns1/billing-sa]"],
                    },
                ]
            }),
        ]
    );
}

#[test]
fn test_declared_but_unused_queue_is_not_emitted() {
    let apps = input::apps_from_str(APPS).unwrap();
    let usage = input::resource_usage_from_str(RESOURCE_USAGE).unwrap();
    let compilation = compile(&apps, &usage, &locators()).unwrap();

    assert!(render(&compilation.policies)
        .iter()
        .all(|r| !r["resource"].as_str().unwrap().contains("events")));
}

#[test]
fn test_scheduled_job_identity() {
    let apps = input::apps_from_str("batch:\n  - scheduled-cleanup\n").unwrap();
    let usage = input::resource_usage_from_str("usage: {}\n").unwrap();
    let compilation = compile(&apps, &usage, &locators()).unwrap();

    let records = render(&compilation.policies);
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0]["resource"],
        "projects/iam-shr-dev-x/serviceAccounts/s-cleanup-sa@iam-shr-dev-x.iam.gserviceaccount.com"
    );
    assert_eq!(
        records[0]["bindings"][1]["members"][0],
        "serviceAccount:gke-shr-dev-x.svc.id.goog[batch/s-cleanup-sa]"
    );
}

#[test]
fn test_unknown_operation_does_not_abort() {
    let apps = input::apps_from_str(APPS).unwrap();
    let usage = input::resource_usage_from_str(
        &RESOURCE_USAGE.replace("read: [invoices]", "delete: [invoices]"),
    )
    .unwrap();

    let compilation = compile(&apps, &usage, &locators()).unwrap();
    assert_eq!(compilation.diagnostics.count("unknown-operation"), 1);

    let records = render(&compilation.policies);
    assert_eq!(records.len(), 1);
    assert!(records[0]["resource"]
        .as_str()
        .unwrap()
        .contains("serviceAccounts"));
}

#[test]
fn test_missing_unit_locator_is_fatal() {
    let apps = input::apps_from_str(APPS).unwrap();
    let usage = input::resource_usage_from_str(RESOURCE_USAGE).unwrap();
    let locators = LocatorSet::builder().company("acme").build().unwrap();

    let err = compile(&apps, &usage, &locators).unwrap_err();
    assert!(err.to_string().contains("unit"));
}

#[test]
fn test_compile_files() {
    let dir = tempdir().unwrap();
    let apps_path = dir.path().join("apps.yaml");
    let usage_path = dir.path().join("resource-usage.yaml");
    fs::write(&apps_path, APPS).unwrap();
    fs::write(&usage_path, RESOURCE_USAGE).unwrap();

    let compilation = compile_files(&apps_path, &usage_path, &locators()).unwrap();
    assert_eq!(compilation.policies.policies().count(), 2);

    let missing = dir.path().join("missing.yaml");
    assert!(compile_files(&apps_path, &missing, &locators()).is_err());
}
