//! Name derivation: application identities and resource full names.
//!
//! Everything here is a pure function of its inputs and the [`LocatorSet`].
//! Convention violations are recorded as diagnostics; a missing locator is
//! returned as a [`NamingError`] and should abort the run.

mod identity;
mod resources;
pub mod templates;

pub use identity::{
    derive_cloud_service_account_name, derive_kubernetes_name, derive_service_account_full_name,
    derive_workload_identity_subject, is_valid_gsa_username, sa_username,
};
pub use resources::{
    derive_resource_full_names, ResourceFullNameEntry, ResourceFullNameMap, ResourceKind,
};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::NamingError;
use crate::input::{Apps, Resources};
use crate::locator::LocatorSet;
use crate::types::{AppName, GsaName, KsaName, NamespaceName, ResourceName};
use std::collections::BTreeMap;
use tracing::debug;

/// Every name the aggregator needs, derived once up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedNames {
    pub ksa_names: BTreeMap<AppName, KsaName>,
    pub gsa_names: BTreeMap<AppName, GsaName>,
    pub full_names: ResourceFullNameMap,
}

impl DerivedNames {
    pub fn ksa_name(&self, app: &AppName) -> Option<&KsaName> {
        self.ksa_names.get(app)
    }

    pub fn gsa_name(&self, app: &AppName) -> Option<&GsaName> {
        self.gsa_names.get(app)
    }
}

/// Derive Kubernetes and cloud identities for every app, full names for every
/// declared resource, and a `serviceAccounts` entry for each app's cloud
/// service account.
pub fn derive_names(
    apps: &Apps,
    resources: &Resources,
    locators: &LocatorSet,
    diagnostics: &mut Diagnostics,
) -> Result<DerivedNames, NamingError> {
    let mut names = DerivedNames::default();

    let mut owners: BTreeMap<&AppName, &NamespaceName> = BTreeMap::new();
    for (namespace, app_names) in apps {
        for app in app_names {
            if let Some(previous) = owners.insert(app, namespace) {
                if previous != namespace {
                    diagnostics.push(Diagnostic::DuplicateApplication {
                        app: app.clone(),
                        kept: namespace.clone(),
                        dropped: previous.clone(),
                    });
                }
            }
        }
    }

    for (app, namespace) in &owners {
        names
            .ksa_names
            .insert((*app).clone(), derive_kubernetes_name(namespace, app));
    }
    debug!(ksa_names = ?names.ksa_names, "derived KSA names");

    for app in owners.keys() {
        let gsa = derive_cloud_service_account_name(app, locators, diagnostics)?;
        names.gsa_names.insert((*app).clone(), gsa);
    }
    debug!(gsa_names = ?names.gsa_names, "derived GSA names");

    for (kind, owned) in resources {
        for (owner, resource_names) in owned {
            for name in resource_names {
                let entries = derive_resource_full_names(kind, owner, name, locators)?;
                if entries.is_empty() {
                    diagnostics.push(Diagnostic::UnsupportedResourceKind {
                        kind: kind.to_string(),
                    });
                }
                for entry in entries {
                    names.full_names.insert(entry);
                }
            }
        }
    }

    // Each app's service account is a resource in its own right: it needs
    // the workload identity grants added by the aggregator.
    for (app, gsa) in &names.gsa_names {
        names.full_names.insert(ResourceFullNameEntry {
            kind: ResourceKind::ServiceAccounts,
            name: ResourceName::from(app),
            full_name: derive_service_account_full_name(gsa, locators)?,
        });
    }
    debug!(count = names.full_names.len(), "derived resource full names");

    Ok(names)
}
