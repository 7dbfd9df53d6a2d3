//! Advisory findings collected while compiling policies.
//!
//! Nothing recorded here aborts a run. Naming and aggregation push findings
//! into a [`Diagnostics`] value that the caller owns, and the caller decides
//! whether to log them, fail on them, or ignore them.

use crate::types::{AppName, NamespaceName, OperationName, ResourceName};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A derived service-account username fails the provider's syntax rules.
    /// The name is still used; the provider will reject it at apply time.
    InvalidServiceAccountUsername { app: AppName, username: String },

    /// A resource kind no naming function or permission entry knows about.
    UnsupportedResourceKind { kind: String },

    /// An operation with no permission table entry for the kind.
    UnknownOperation {
        kind: String,
        operation: OperationName,
    },

    /// Usage declared for an application that is not in the apps file.
    UnknownApplication { app: AppName },

    /// Usage referencing a resource that was never declared.
    UnknownResource { kind: String, name: ResourceName },

    /// The same application listed under more than one namespace.
    DuplicateApplication {
        app: AppName,
        kept: NamespaceName,
        dropped: NamespaceName,
    },
}

impl Diagnostic {
    /// Stable short code for the finding, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::InvalidServiceAccountUsername { .. } => "invalid-sa-username",
            Diagnostic::UnsupportedResourceKind { .. } => "unsupported-kind",
            Diagnostic::UnknownOperation { .. } => "unknown-operation",
            Diagnostic::UnknownApplication { .. } => "unknown-app",
            Diagnostic::UnknownResource { .. } => "unknown-resource",
            Diagnostic::DuplicateApplication { .. } => "duplicate-app",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidServiceAccountUsername { app, username } => {
                write!(f, "invalid service account username {username} for app {app}")
            }
            Diagnostic::UnsupportedResourceKind { kind } => {
                write!(f, "resource kind {kind} is not supported")
            }
            Diagnostic::UnknownOperation { kind, operation } => {
                write!(f, "no roles defined for operation {operation} on {kind}")
            }
            Diagnostic::UnknownApplication { app } => {
                write!(f, "usage declared for undeclared app {app}")
            }
            Diagnostic::UnknownResource { kind, name } => {
                write!(f, "usage references undeclared {kind} resource {name}")
            }
            Diagnostic::DuplicateApplication { app, kept, dropped } => {
                write!(
                    f,
                    "app {app} declared in namespaces {kept} and {dropped}; using {kept}"
                )
            }
        }
    }
}

/// Ordered collection of findings from one run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count findings with the given code.
    pub fn count(&self, code: &str) -> usize {
        self.entries.iter().filter(|d| d.code() == code).count()
    }

    /// Emit every finding as a `warn` event.
    pub fn log(&self) {
        for diagnostic in &self.entries {
            warn!(code = diagnostic.code(), "{}", diagnostic);
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
