pub mod aggregator;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod locator;
pub mod naming;
pub mod output;
pub mod permissions;
pub mod policy;
pub mod types;

pub use aggregator::{derive_policies, PolicyAggregator};
pub use compiler::{compile, compile_files, Compilation};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{IamGenError, InputError, LocatorError, NamingError, Result};
pub use input::{Apps, ResourceUsage, Resources, Usage};
pub use locator::{LocatorSet, LocatorSetBuilder};
pub use naming::{derive_names, DerivedNames, ResourceKind};
pub use output::{write_policies, OutputFormat};
pub use permissions::PermissionTable;
pub use policy::{ResourcePolicy, ResourcePolicyMap, RoleBinding};
