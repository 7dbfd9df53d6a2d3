//! Input documents and their YAML loaders.

use crate::error::InputError;
use crate::naming::ResourceKind;
use crate::permissions::PermissionTable;
use crate::types::{AppName, NamespaceName, OperationName, OwnerKey, ResourceName};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Namespace → applications it owns.
pub type Apps = BTreeMap<NamespaceName, Vec<AppName>>;

/// Kind → owner key → declared short names.
pub type Resources = BTreeMap<ResourceKind, BTreeMap<OwnerKey, Vec<ResourceName>>>;

/// Operation → short names of the resources it is performed on.
pub type KindUsage = BTreeMap<OperationName, Vec<ResourceName>>;

/// App → kind → operation → short names.
pub type Usage = BTreeMap<AppName, BTreeMap<ResourceKind, KindUsage>>;

/// Contents of the resource usage file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    #[serde(default, alias = "Resources")]
    pub resources: Resources,

    #[serde(default, alias = "Permissions")]
    pub permissions: PermissionTable,

    #[serde(default, alias = "Usage")]
    pub usage: Usage,
}

fn load_yaml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, InputError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| InputError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_apps<P: AsRef<Path>>(path: P) -> Result<Apps, InputError> {
    let apps: Apps = load_yaml(path)?;
    debug!(apps = ?apps, "loaded apps file");
    Ok(apps)
}

pub fn load_resource_usage<P: AsRef<Path>>(path: P) -> Result<ResourceUsage, InputError> {
    let usage: ResourceUsage = load_yaml(path)?;
    debug!(resource_usage = ?usage, "loaded resource usage file");
    Ok(usage)
}

/// Parse an apps document that is already in memory.
pub fn apps_from_str(yaml: &str) -> Result<Apps, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Parse a resource usage document that is already in memory.
pub fn resource_usage_from_str(yaml: &str) -> Result<ResourceUsage, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const USAGE: &str = r#"
resources:
  buckets:
    own1: [invoices, receipts]
  queues:
    own2: [events]
permissions:
  buckets:
    read: [roles/storage.objectViewer]
usage:
  billing:
    buckets:
      read: [invoices]
    queues:
      publish: [events]
"#;

    #[test]
    fn test_parse_resource_usage() {
        let ru = resource_usage_from_str(USAGE).unwrap();

        let buckets = &ru.resources[&ResourceKind::Buckets];
        assert_eq!(
            buckets[&OwnerKey::from("own1")],
            vec![ResourceName::from("invoices"), ResourceName::from("receipts")]
        );
        assert!(ru.resources.contains_key(&ResourceKind::Queues));
        assert!(!ru.permissions.is_empty());

        let billing = &ru.usage[&AppName::from("billing")];
        assert_eq!(
            billing[&ResourceKind::Queues][&OperationName::from("publish")],
            vec![ResourceName::from("events")]
        );
    }

    #[test]
    fn test_capitalized_sections_and_defaults() {
        let ru = resource_usage_from_str("Resources:\n  buckets:\n    own1: [a]\n").unwrap();
        assert_eq!(ru.resources.len(), 1);
        assert!(ru.permissions.is_empty());
        assert!(ru.usage.is_empty());
    }

    #[test]
    fn test_load_apps_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ns1: [billing, scheduled-report]\nns2:\n  - ledger").unwrap();

        let apps = load_apps(file.path()).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[&NamespaceName::from("ns2")], vec![AppName::from("ledger")]);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let err = load_apps("/nonexistent/apps.yaml").unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/apps.yaml"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ns1: {{ not: [valid").unwrap();
        let err = load_resource_usage(file.path()).unwrap_err();
        assert!(matches!(err, InputError::Yaml { .. }));
    }
}
