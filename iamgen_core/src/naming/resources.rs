//! Resource kinds and their fully-qualified names.

use super::templates::{self, BucketParams, ProjectParams, PubsubCollection, PubsubParams};
use crate::error::NamingError;
use crate::locator::LocatorSet;
use crate::types::{OwnerKey, ResourceFullName, ResourceName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Kinds of resource that appear in declarations, usage and permissions.
///
/// `Queues` is virtual: it stands for a topic and a subscription, which are
/// addressed and granted separately as `QueuesTopics` and
/// `QueuesSubscriptions`. Unrecognized kind strings are kept as `Other` so
/// they can be reported instead of rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceKind {
    Buckets,
    Queues,
    QueuesTopics,
    QueuesSubscriptions,
    ServiceAccounts,
    Other(String),
}

impl ResourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Buckets => "buckets",
            ResourceKind::Queues => "queues",
            ResourceKind::QueuesTopics => "queues.topics",
            ResourceKind::QueuesSubscriptions => "queues.subscriptions",
            ResourceKind::ServiceAccounts => "serviceAccounts",
            ResourceKind::Other(kind) => kind,
        }
    }

    /// The addressable kinds a usage of this kind is granted on.
    pub fn effective_kinds(&self) -> Vec<ResourceKind> {
        match self {
            ResourceKind::Queues => vec![
                ResourceKind::QueuesTopics,
                ResourceKind::QueuesSubscriptions,
            ],
            ResourceKind::Buckets
            | ResourceKind::QueuesTopics
            | ResourceKind::QueuesSubscriptions
            | ResourceKind::ServiceAccounts
            | ResourceKind::Other(_) => vec![self.clone()],
        }
    }

    /// Derive the full names for one declared resource.
    ///
    /// Returns no entries for kinds that cannot be declared directly; the
    /// caller reports those.
    pub fn derive_full_names(
        &self,
        owner: &OwnerKey,
        name: &ResourceName,
        locators: &LocatorSet,
    ) -> Result<Vec<ResourceFullNameEntry>, NamingError> {
        match self {
            ResourceKind::Buckets => bucket_full_names(name, locators),
            ResourceKind::Queues => queue_full_names(owner, name, locators),
            ResourceKind::QueuesTopics
            | ResourceKind::QueuesSubscriptions
            | ResourceKind::ServiceAccounts
            | ResourceKind::Other(_) => Ok(Vec::new()),
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(kind: &str) -> Self {
        match kind {
            "buckets" => ResourceKind::Buckets,
            "queues" => ResourceKind::Queues,
            "queues.topics" => ResourceKind::QueuesTopics,
            "queues.subscriptions" => ResourceKind::QueuesSubscriptions,
            "serviceAccounts" => ResourceKind::ServiceAccounts,
            other => ResourceKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceKind {
    fn from(kind: String) -> Self {
        match ResourceKind::from(kind.as_str()) {
            ResourceKind::Other(_) => ResourceKind::Other(kind),
            known => known,
        }
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ResourceKind::from(s))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFullNameEntry {
    pub kind: ResourceKind,
    pub name: ResourceName,
    pub full_name: ResourceFullName,
}

fn bucket_full_names(
    name: &ResourceName,
    locators: &LocatorSet,
) -> Result<Vec<ResourceFullNameEntry>, NamingError> {
    let params = BucketParams::resolve(locators)?;
    let bucket = templates::bucket_name(name.as_str(), &params);

    Ok(vec![ResourceFullNameEntry {
        kind: ResourceKind::Buckets,
        name: name.clone(),
        full_name: ResourceFullName::new(templates::bucket_full_name(&bucket)),
    }])
}

// The owner key is used as the project ID prefix. That holds for the current
// project naming convention; legacy projects would need a lookup instead.
fn queue_full_names(
    owner: &OwnerKey,
    name: &ResourceName,
    locators: &LocatorSet,
) -> Result<Vec<ResourceFullNameEntry>, NamingError> {
    let pubsub_name = templates::pubsub_name(name.as_str(), &PubsubParams::resolve(locators)?);
    let project = templates::project_id(owner.as_str(), &ProjectParams::resolve(locators)?);

    Ok(vec![
        ResourceFullNameEntry {
            kind: ResourceKind::QueuesTopics,
            name: name.clone(),
            full_name: ResourceFullName::new(templates::pubsub_full_name(
                &project,
                PubsubCollection::Topics,
                &pubsub_name,
            )),
        },
        ResourceFullNameEntry {
            kind: ResourceKind::QueuesSubscriptions,
            name: name.clone(),
            full_name: ResourceFullName::new(templates::pubsub_full_name(
                &project,
                PubsubCollection::Subscriptions,
                &pubsub_name,
            )),
        },
    ])
}

/// Full names for one declared resource. Kinds without a naming convention
/// yield no entries.
pub fn derive_resource_full_names(
    kind: &ResourceKind,
    owner: &OwnerKey,
    name: &ResourceName,
    locators: &LocatorSet,
) -> Result<Vec<ResourceFullNameEntry>, NamingError> {
    kind.derive_full_names(owner, name, locators)
}

/// (kind, short name) → full name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFullNameMap {
    names: BTreeMap<ResourceKind, BTreeMap<ResourceName, ResourceFullName>>,
}

impl ResourceFullNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, replacing any earlier full name for the same pair.
    pub fn insert(&mut self, entry: ResourceFullNameEntry) {
        debug!(
            kind = %entry.kind,
            name = %entry.name,
            full_name = %entry.full_name,
            "derived resource full name"
        );
        self.names
            .entry(entry.kind)
            .or_default()
            .insert(entry.name, entry.full_name);
    }

    pub fn get(&self, kind: &ResourceKind, name: &ResourceName) -> Option<&ResourceFullName> {
        self.names.get(kind).and_then(|names| names.get(name))
    }

    pub fn len(&self) -> usize {
        self.names.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, &ResourceName, &ResourceFullName)> {
        self.names
            .iter()
            .flat_map(|(kind, names)| names.iter().map(move |(name, full)| (kind, name, full)))
    }
}
