//! Application identities: Kubernetes service accounts, cloud service
//! accounts, and the workload-identity subject that links the two.

use super::templates::{self, SharedIamParams};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::NamingError;
use crate::locator::LocatorSet;
use crate::types::{AppName, GsaName, KsaName, NamespaceName, ResourceFullName};
use lazy_static::lazy_static;
use regex::Regex;

pub const SA_USERNAME_SUFFIX: &str = "-sa";

/// Prefix marking scheduled jobs, and the abbreviation it is rewritten to so
/// usernames stay within the provider's length limit.
pub const SCHEDULED_PREFIX: &str = "scheduled-";
pub const SCHEDULED_ABBREVIATION: &str = "s-";

lazy_static! {
    // Lowercase letter first, 6-30 characters, ends in a letter or digit.
    static ref GSA_USERNAME_PATTERN: Regex =
        Regex::new(r"^[a-z](?:[-a-z0-9]{4,28}[a-z0-9])$").expect("valid GSA username pattern");
}

/// Service account username shared by the Kubernetes and cloud accounts.
pub fn sa_username(app: &AppName) -> String {
    let username = format!("{}{}", app, SA_USERNAME_SUFFIX);
    match username.strip_prefix(SCHEDULED_PREFIX) {
        Some(rest) => format!("{}{}", SCHEDULED_ABBREVIATION, rest),
        None => username,
    }
}

pub fn is_valid_gsa_username(username: &str) -> bool {
    GSA_USERNAME_PATTERN.is_match(username)
}

/// `<namespace>/<username>`
pub fn derive_kubernetes_name(namespace: &NamespaceName, app: &AppName) -> KsaName {
    KsaName::new(format!("{}/{}", namespace, sa_username(app)))
}

/// Render the app's cloud service account email. A username that breaks the
/// provider's syntax rules is recorded in `diagnostics` and used anyway.
pub fn derive_cloud_service_account_name(
    app: &AppName,
    locators: &LocatorSet,
    diagnostics: &mut Diagnostics,
) -> Result<GsaName, NamingError> {
    let username = sa_username(app);
    if !is_valid_gsa_username(&username) {
        diagnostics.push(Diagnostic::InvalidServiceAccountUsername {
            app: app.clone(),
            username: username.clone(),
        });
    }

    let params = SharedIamParams::resolve(locators, templates::GSA_NAME)?;
    Ok(GsaName::new(templates::gsa_name(&username, &params)))
}

/// Subject that the cluster uses when impersonating a cloud service account.
pub fn derive_workload_identity_subject(
    ksa: &KsaName,
    locators: &LocatorSet,
) -> Result<GsaName, NamingError> {
    let params = SharedIamParams::resolve(locators, templates::GSA_FOR_KSA_NAME)?;
    Ok(GsaName::new(templates::gsa_for_ksa_name(ksa.as_str(), &params)))
}

/// Resource path of a cloud service account, for policies granted on it.
pub fn derive_service_account_full_name(
    gsa: &GsaName,
    locators: &LocatorSet,
) -> Result<ResourceFullName, NamingError> {
    let params = SharedIamParams::resolve(locators, templates::GSA_FULL_NAME)?;
    Ok(ResourceFullName::new(templates::gsa_full_name(
        gsa.as_str(),
        &params,
    )))
}
