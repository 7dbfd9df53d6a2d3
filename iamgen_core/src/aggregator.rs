//! Folds declared usage into per-resource policies.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::NamingError;
use crate::input::{KindUsage, Usage};
use crate::locator::LocatorSet;
use crate::naming::{derive_workload_identity_subject, DerivedNames, ResourceKind};
use crate::permissions::PermissionTable;
use crate::policy::ResourcePolicyMap;
use crate::types::{AppName, GsaName, IamRole, OperationName, ResourceName};
use std::collections::BTreeMap;
use tracing::debug;

/// Lets an app's cloud service account mint tokens for itself.
pub const TOKEN_CREATOR_ROLE: &str = "roles/iam.serviceAccountTokenCreator";

/// Lets the app's Kubernetes service account act as the cloud service account.
pub const WORKLOAD_IDENTITY_USER_ROLE: &str = "roles/iam.workloadIdentityUser";

pub struct PolicyAggregator<'a> {
    names: &'a DerivedNames,
    permissions: &'a PermissionTable,
    locators: &'a LocatorSet,
    policies: ResourcePolicyMap,
}

impl<'a> PolicyAggregator<'a> {
    pub fn new(
        names: &'a DerivedNames,
        permissions: &'a PermissionTable,
        locators: &'a LocatorSet,
    ) -> Self {
        Self {
            names,
            permissions,
            locators,
            policies: ResourcePolicyMap::new(),
        }
    }

    /// Grant the roles for every (kind, operation, resource) the app declares.
    /// Usage for an app with no derived identity is reported and skipped.
    pub fn add_app_usage(
        &mut self,
        app: &AppName,
        usage: &BTreeMap<ResourceKind, KindUsage>,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(member) = self.names.gsa_name(app).cloned() else {
            diagnostics.push(Diagnostic::UnknownApplication { app: app.clone() });
            return;
        };

        for (kind, kind_usage) in usage {
            for (operation, resource_names) in kind_usage {
                for name in resource_names {
                    debug!(
                        app = %app,
                        kind = %kind,
                        oper = %operation,
                        rsrc = %name,
                        "app resource usage"
                    );
                    self.add_usage(&member, kind, operation, name, diagnostics);
                }
            }
        }
    }

    fn add_usage(
        &mut self,
        member: &GsaName,
        kind: &ResourceKind,
        operation: &OperationName,
        name: &ResourceName,
        diagnostics: &mut Diagnostics,
    ) {
        if let ResourceKind::Other(unsupported) = kind {
            diagnostics.push(Diagnostic::UnsupportedResourceKind {
                kind: unsupported.clone(),
            });
            return;
        }

        let effective = kind.effective_kinds();

        // A queue operation normally applies to only one of its two halves;
        // it is unknown only if neither half defines it.
        if !effective
            .iter()
            .any(|k| self.permissions.defines(k, operation))
        {
            diagnostics.push(Diagnostic::UnknownOperation {
                kind: kind.to_string(),
                operation: operation.clone(),
            });
        }

        let mut undeclared = false;
        for effective_kind in &effective {
            let roles = self.permissions.roles(effective_kind, operation);
            match self.names.full_names.get(effective_kind, name) {
                Some(full_name) => self.policies.add(full_name, roles, member),
                None => undeclared = true,
            }
        }
        if undeclared {
            diagnostics.push(Diagnostic::UnknownResource {
                kind: kind.to_string(),
                name: name.clone(),
            });
        }
    }

    /// Add the workload identity chain for an app: its cloud service account
    /// may create tokens for itself, and its Kubernetes identity may act as it.
    pub fn add_workload_identity(&mut self, app: &AppName) -> Result<(), NamingError> {
        let (Some(gsa), Some(ksa)) = (self.names.gsa_name(app), self.names.ksa_name(app)) else {
            return Ok(());
        };
        let Some(sa_resource) = self
            .names
            .full_names
            .get(&ResourceKind::ServiceAccounts, &ResourceName::from(app))
        else {
            return Ok(());
        };

        let subject = derive_workload_identity_subject(ksa, self.locators)?;
        self.policies
            .add(sa_resource, &[IamRole::from(TOKEN_CREATOR_ROLE)], gsa);
        self.policies.add(
            sa_resource,
            &[IamRole::from(WORKLOAD_IDENTITY_USER_ROLE)],
            &subject,
        );
        Ok(())
    }

    pub fn finish(self) -> ResourcePolicyMap {
        debug!(policies = self.policies.len(), "derived policies");
        self.policies
    }
}

/// Build the policy map for all declared usage.
///
/// Every app with a derived identity gets its workload identity bindings,
/// whether or not it declares any usage.
pub fn derive_policies(
    usage: &Usage,
    names: &DerivedNames,
    permissions: &PermissionTable,
    locators: &LocatorSet,
    diagnostics: &mut Diagnostics,
) -> Result<ResourcePolicyMap, NamingError> {
    let mut aggregator = PolicyAggregator::new(names, permissions, locators);

    for (app, app_usage) in usage {
        aggregator.add_app_usage(app, app_usage, diagnostics);
    }
    for app in names.gsa_names.keys() {
        aggregator.add_workload_identity(app)?;
    }

    Ok(aggregator.finish())
}
