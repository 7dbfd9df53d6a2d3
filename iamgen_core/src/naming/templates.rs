//! One formatting function per naming convention.
//!
//! Each function takes the values it substitutes as plain arguments or as a
//! small parameter struct. The structs are resolved from a [`LocatorSet`]
//! up front, so a missing locator surfaces as a [`NamingError`] naming the
//! template that needed it, before anything is formatted.

use crate::error::NamingError;
use crate::locator::{LocatorSet, COMPANY, PROVIDER, REGION, STAGE, UNIT};

pub const GSA_NAME: &str = "gsaName";
pub const GSA_FOR_KSA_NAME: &str = "gsaForKSAName";
pub const GSA_FULL_NAME: &str = "gsaFullName";
pub const BUCKET_NAME: &str = "bucketName";
pub const PROJECT_NAME: &str = "projectName";
pub const PUBSUB_NAME: &str = "pubsubName";

/// Values shared by the shared-IAM-project conventions: service account
/// emails, workload identity subjects and service account resource paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedIamParams<'a> {
    pub stage: &'a str,
    pub unit: &'a str,
}

impl<'a> SharedIamParams<'a> {
    pub fn resolve(locators: &'a LocatorSet, template: &'static str) -> Result<Self, NamingError> {
        Ok(Self {
            stage: locators.require(STAGE, template)?,
            unit: locators.require(UNIT, template)?,
        })
    }
}

/// `<username>@iam-shr-<stage>-<unit>.iam.gserviceaccount.com`
pub fn gsa_name(username: &str, p: &SharedIamParams<'_>) -> String {
    format!(
        "{}@iam-shr-{}-{}.iam.gserviceaccount.com",
        username, p.stage, p.unit
    )
}

/// `gke-shr-<stage>-<unit>.svc.id.goog[<namespace>/<username>]`
pub fn gsa_for_ksa_name(ksa_name: &str, p: &SharedIamParams<'_>) -> String {
    format!("gke-shr-{}-{}.svc.id.goog[{}]", p.stage, p.unit, ksa_name)
}

/// `projects/iam-shr-<stage>-<unit>/serviceAccounts/<gsa>`
pub fn gsa_full_name(gsa_name: &str, p: &SharedIamParams<'_>) -> String {
    format!(
        "projects/iam-shr-{}-{}/serviceAccounts/{}",
        p.stage, p.unit, gsa_name
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketParams<'a> {
    pub company: &'a str,
    pub stage: &'a str,
    pub region: &'a str,
    pub provider: &'a str,
}

impl<'a> BucketParams<'a> {
    pub fn resolve(locators: &'a LocatorSet) -> Result<Self, NamingError> {
        Ok(Self {
            company: locators.require(COMPANY, BUCKET_NAME)?,
            stage: locators.require(STAGE, BUCKET_NAME)?,
            region: locators.require(REGION, BUCKET_NAME)?,
            provider: locators.require(PROVIDER, BUCKET_NAME)?,
        })
    }
}

/// `<company>-<name>-<stage>-<region><provider>`
pub fn bucket_name(name: &str, p: &BucketParams<'_>) -> String {
    format!(
        "{}-{}-{}-{}{}",
        p.company, name, p.stage, p.region, p.provider
    )
}

/// `projects/_/buckets/<bucket>`
pub fn bucket_full_name(bucket_name: &str) -> String {
    format!("projects/_/buckets/{}", bucket_name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectParams<'a> {
    pub stage: &'a str,
    pub unit: &'a str,
}

impl<'a> ProjectParams<'a> {
    pub fn resolve(locators: &'a LocatorSet) -> Result<Self, NamingError> {
        Ok(Self {
            stage: locators.require(STAGE, PROJECT_NAME)?,
            unit: locators.require(UNIT, PROJECT_NAME)?,
        })
    }
}

/// `<prefix>-<stage>-<unit>`
pub fn project_id(prefix: &str, p: &ProjectParams<'_>) -> String {
    format!("{}-{}-{}", prefix, p.stage, p.unit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PubsubParams<'a> {
    pub stage: &'a str,
    pub region: &'a str,
    pub provider: &'a str,
}

impl<'a> PubsubParams<'a> {
    pub fn resolve(locators: &'a LocatorSet) -> Result<Self, NamingError> {
        Ok(Self {
            stage: locators.require(STAGE, PUBSUB_NAME)?,
            region: locators.require(REGION, PUBSUB_NAME)?,
            provider: locators.require(PROVIDER, PUBSUB_NAME)?,
        })
    }
}

/// `<name>.<stage>.<region><provider>`
pub fn pubsub_name(name: &str, p: &PubsubParams<'_>) -> String {
    format!("{}.{}.{}{}", name, p.stage, p.region, p.provider)
}

/// Pub/Sub resource collection within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubsubCollection {
    Topics,
    Subscriptions,
}

impl PubsubCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PubsubCollection::Topics => "topics",
            PubsubCollection::Subscriptions => "subscriptions",
        }
    }
}

/// `projects/<project>/<collection>/<name>`
pub fn pubsub_full_name(project: &str, collection: PubsubCollection, name: &str) -> String {
    format!("projects/{}/{}/{}", project, collection.as_str(), name)
}
