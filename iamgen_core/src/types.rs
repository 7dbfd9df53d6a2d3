//! Strongly-typed names used throughout the compiler.
//!
//! Every identifier that flows through naming and aggregation is an opaque,
//! case-sensitive string. Wrapping each role in its own type keeps an app name
//! from being passed where a full resource name is expected.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

macro_rules! string_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_name!(
    /// Kubernetes namespace that owns a set of applications.
    NamespaceName
);
string_name!(
    /// Application identifier as declared in the apps file.
    AppName
);
string_name!(
    /// Namespace-qualified Kubernetes service account, `<namespace>/<username>`.
    KsaName
);
string_name!(
    /// Cloud service account identity (email-like). Also used for the
    /// workload-identity subject, which is granted roles the same way.
    GsaName
);
string_name!(
    /// IAM role identifier, e.g. `roles/storage.objectViewer`.
    IamRole
);
string_name!(
    /// Key associating a resource with its owning project.
    OwnerKey
);
string_name!(
    /// Short, declared name of a resource.
    ResourceName
);
string_name!(
    /// Fully-qualified, provider-addressable resource name.
    ResourceFullName
);
string_name!(
    /// Operation an application performs on a resource (`read`, `publish`, ...).
    OperationName
);

impl From<&AppName> for ResourceName {
    /// Each app's service account is registered as a resource under the app's name.
    fn from(app: &AppName) -> Self {
        ResourceName(app.0.clone())
    }
}
