use crate::naming::ResourceKind;
use crate::types::{IamRole, OperationName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Static table of the roles each operation on each resource kind needs.
///
/// Loaded from the `permissions` section of the resource usage file, keyed
/// by addressable kind (`buckets`, `queues.topics`, `queues.subscriptions`)
/// and then by operation name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    entries: BTreeMap<ResourceKind, BTreeMap<OperationName, Vec<IamRole>>>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and programmatic tables.
    pub fn with_roles<I, R>(mut self, kind: ResourceKind, operation: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<IamRole>,
    {
        self.entries
            .entry(kind)
            .or_default()
            .insert(
                OperationName::from(operation),
                roles.into_iter().map(Into::into).collect(),
            );
        self
    }

    /// Roles needed for `operation` on `kind`, without reporting misses.
    pub fn lookup(&self, kind: &ResourceKind, operation: &OperationName) -> Option<&[IamRole]> {
        self.entries
            .get(kind)
            .and_then(|ops| ops.get(operation))
            .map(Vec::as_slice)
    }

    /// Roles needed for `operation` on `kind`. Unknown kinds and operations
    /// resolve to no roles, so a partial configuration still yields partial
    /// output.
    pub fn roles(&self, kind: &ResourceKind, operation: &OperationName) -> &[IamRole] {
        self.lookup(kind, operation).unwrap_or(&[])
    }

    /// Whether any entry exists for `operation` on `kind`.
    pub fn defines(&self, kind: &ResourceKind, operation: &OperationName) -> bool {
        self.lookup(kind, operation).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
