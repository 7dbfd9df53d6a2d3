//! End-to-end compilation: names first, then policies.

use crate::aggregator::derive_policies;
use crate::diagnostics::Diagnostics;
use crate::error::{NamingError, Result};
use crate::input::{load_apps, load_resource_usage, Apps, ResourceUsage};
use crate::locator::LocatorSet;
use crate::naming::{derive_names, DerivedNames};
use crate::policy::ResourcePolicyMap;
use std::path::Path;
use tracing::info;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub names: DerivedNames,
    pub policies: ResourcePolicyMap,
    pub diagnostics: Diagnostics,
}

/// Derive all names, then fold the declared usage into policies.
///
/// Fails only on a naming error; every other problem is recorded in the
/// returned diagnostics.
pub fn compile(
    apps: &Apps,
    resource_usage: &ResourceUsage,
    locators: &LocatorSet,
) -> std::result::Result<Compilation, NamingError> {
    let mut diagnostics = Diagnostics::new();

    let names = derive_names(apps, &resource_usage.resources, locators, &mut diagnostics)?;
    let policies = derive_policies(
        &resource_usage.usage,
        &names,
        &resource_usage.permissions,
        locators,
        &mut diagnostics,
    )?;

    info!(
        apps = names.gsa_names.len(),
        resources = names.full_names.len(),
        policies = policies.policies().count(),
        diagnostics = diagnostics.len(),
        "compiled resource policies"
    );

    Ok(Compilation {
        names,
        policies,
        diagnostics,
    })
}

/// Load both input files and compile them.
pub fn compile_files<A: AsRef<Path>, U: AsRef<Path>>(
    apps_path: A,
    usage_path: U,
    locators: &LocatorSet,
) -> Result<Compilation> {
    let apps = load_apps(apps_path)?;
    let resource_usage = load_resource_usage(usage_path)?;
    Ok(compile(&apps, &resource_usage, locators)?)
}
