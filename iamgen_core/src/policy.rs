//! Resource policies: role bindings accumulated per resource.
//!
//! All three levels are upserted: adding to a role or resource that has not
//! been seen yet creates it. Members and roles are kept in ordered sets, so
//! repeated grants collapse and serialized output does not depend on the
//! order grants were made in.

use crate::types::{GsaName, IamRole, ResourceFullName};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix applied to members when a binding is serialized.
pub const MEMBER_PREFIX: &str = "serviceAccount:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBinding {
    role: IamRole,
    members: BTreeSet<GsaName>,
}

impl RoleBinding {
    pub fn new(role: IamRole) -> Self {
        Self {
            role,
            members: BTreeSet::new(),
        }
    }

    /// Add a member; a member already present is left as is.
    pub fn add(&mut self, member: GsaName) {
        self.members.insert(member);
    }

    pub fn role(&self) -> &IamRole {
        &self.role
    }

    pub fn members(&self) -> impl Iterator<Item = &GsaName> {
        self.members.iter()
    }

    pub fn contains(&self, member: &GsaName) -> bool {
        self.members.contains(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

struct PrefixedMembers<'a>(&'a BTreeSet<GsaName>);

impl Serialize for PrefixedMembers<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for member in self.0 {
            seq.serialize_element(&format!("{}{}", MEMBER_PREFIX, member))?;
        }
        seq.end()
    }
}

impl Serialize for RoleBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RoleBinding", 2)?;
        state.serialize_field("role", &self.role)?;
        state.serialize_field("members", &PrefixedMembers(&self.members))?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePolicy {
    resource: ResourceFullName,
    bindings: BTreeMap<IamRole, RoleBinding>,
}

impl ResourcePolicy {
    pub fn new(resource: ResourceFullName) -> Self {
        Self {
            resource,
            bindings: BTreeMap::new(),
        }
    }

    /// Grant each role in `roles` to `member`.
    pub fn add(&mut self, roles: &[IamRole], member: &GsaName) {
        for role in roles {
            self.bindings
                .entry(role.clone())
                .or_insert_with(|| RoleBinding::new(role.clone()))
                .add(member.clone());
        }
    }

    /// Fold another policy's bindings into this one.
    pub fn merge(&mut self, other: ResourcePolicy) {
        for (role, binding) in other.bindings {
            let target = self
                .bindings
                .entry(role)
                .or_insert_with(|| RoleBinding::new(binding.role.clone()));
            target.members.extend(binding.members);
        }
    }

    pub fn resource(&self) -> &ResourceFullName {
        &self.resource
    }

    pub fn binding(&self, role: &IamRole) -> Option<&RoleBinding> {
        self.bindings.get(role)
    }

    /// Bindings in role order.
    pub fn bindings(&self) -> impl Iterator<Item = &RoleBinding> {
        self.bindings.values()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

struct Bindings<'a>(&'a BTreeMap<IamRole, RoleBinding>);

impl Serialize for Bindings<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

impl Serialize for ResourcePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResourcePolicy", 2)?;
        state.serialize_field("resource", &self.resource)?;
        state.serialize_field("bindings", &Bindings(&self.bindings))?;
        state.end()
    }
}

/// Resource full name → policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePolicyMap {
    policies: BTreeMap<ResourceFullName, ResourcePolicy>,
}

impl ResourcePolicyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `roles` on `resource` to `member`, creating the policy on first
    /// reference. An empty role list still creates the (empty) policy.
    pub fn add(&mut self, resource: &ResourceFullName, roles: &[IamRole], member: &GsaName) {
        self.policies
            .entry(resource.clone())
            .or_insert_with(|| ResourcePolicy::new(resource.clone()))
            .add(roles, member);
    }

    pub fn merge(&mut self, other: ResourcePolicyMap) {
        for (resource, policy) in other.policies {
            match self.policies.get_mut(&resource) {
                Some(existing) => existing.merge(policy),
                None => {
                    self.policies.insert(resource, policy);
                }
            }
        }
    }

    pub fn get(&self, resource: &ResourceFullName) -> Option<&ResourcePolicy> {
        self.policies.get(resource)
    }

    /// Policies with at least one binding, in resource order. This is the
    /// output view: empty policies are never emitted.
    pub fn policies(&self) -> impl Iterator<Item = &ResourcePolicy> {
        self.policies.values().filter(|p| !p.is_empty())
    }

    /// Number of policies including empty ones.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
