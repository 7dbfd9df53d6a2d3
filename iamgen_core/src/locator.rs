//! Locator set: the named values substituted into every naming function.
//!
//! A [`LocatorSet`] is built once from defaults, an optional TOML file, and
//! `name=value` bindings, validated against the supported stage, provider and
//! region tables, and never mutated afterwards.

use crate::error::{LocatorError, NamingError};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const COMPANY: &str = "company";
pub const PROVIDER: &str = "provider";
pub const REGION: &str = "region";
pub const STAGE: &str = "stage";
pub const UNIT: &str = "unit";

pub const DEFAULT_COMPANY: &str = "yoyodyne";
pub const DEFAULT_PROVIDER: &str = "gcp";
pub const DEFAULT_REGION: &str = "usce1";
pub const DEFAULT_STAGE: &str = "dev";

pub const SUPPORTED_STAGES: &[&str] = &["dev", "stg", "prod"];
pub const SUPPORTED_PROVIDERS: &[&str] = &["gcp"];

/// Short region codes accepted for a provider.
pub fn supported_regions(provider: &str) -> &'static [&'static str] {
    match provider {
        "gcp" => &["usce1"],
        _ => &[],
    }
}

pub fn is_supported_stage(stage: &str) -> bool {
    SUPPORTED_STAGES.contains(&stage)
}

pub fn is_supported_provider(provider: &str) -> bool {
    SUPPORTED_PROVIDERS.contains(&provider)
}

/// Split a `name=value` argument. Both sides must be non-empty; only the
/// first `=` separates, so values may contain `=`.
pub fn parse_binding(arg: &str) -> Result<(String, String), LocatorError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(LocatorError::MalformedBinding(arg.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSet {
    values: BTreeMap<String, String>,
}

impl LocatorSet {
    pub fn builder() -> LocatorSetBuilder {
        LocatorSetBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a key needed by `template`; absence is a fatal naming error.
    pub fn require(&self, key: &str, template: &'static str) -> Result<&str, NamingError> {
        self.get(key).ok_or_else(|| NamingError::MissingLocator {
            key: key.to_string(),
            template,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builder for [`LocatorSet`]. `provider`, `region` and `stage` are set
/// through their own methods and always win over free-form bindings.
#[derive(Debug, Clone)]
pub struct LocatorSetBuilder {
    provider: String,
    region: String,
    stage: String,
    extra: BTreeMap<String, String>,
}

impl Default for LocatorSetBuilder {
    fn default() -> Self {
        let mut extra = BTreeMap::new();
        extra.insert(COMPANY.to_string(), DEFAULT_COMPANY.to_string());
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            region: DEFAULT_REGION.to_string(),
            stage: DEFAULT_STAGE.to_string(),
            extra,
        }
    }
}

impl LocatorSetBuilder {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn company(self, company: impl Into<String>) -> Self {
        self.binding(COMPANY, company)
    }

    /// Add or replace a free-form binding.
    pub fn binding(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Add a binding given as a `name=value` argument.
    pub fn parsed_binding(self, arg: &str) -> Result<Self, LocatorError> {
        let (key, value) = parse_binding(arg)?;
        Ok(self.binding(key, value))
    }

    /// Merge bindings from a TOML file of top-level string keys.
    pub fn bindings_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, LocatorError> {
        let path = path.as_ref();
        debug!("Loading locators from {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| LocatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|source| LocatorError::Toml {
            path: path.to_path_buf(),
            source,
        })?;

        for (key, value) in table {
            match value {
                toml::Value::String(s) => {
                    self.extra.insert(key, s);
                }
                _ => {
                    return Err(LocatorError::NonStringValue {
                        key,
                        path: path.to_path_buf(),
                    })
                }
            }
        }
        Ok(self)
    }

    /// Validate the provider, region and stage and freeze the set.
    pub fn build(self) -> Result<LocatorSet, LocatorError> {
        if !is_supported_stage(&self.stage) {
            return Err(LocatorError::UnsupportedStage(self.stage));
        }
        if !is_supported_provider(&self.provider) {
            return Err(LocatorError::UnsupportedProvider(self.provider));
        }
        if !supported_regions(&self.provider).contains(&self.region.as_str()) {
            return Err(LocatorError::UnsupportedRegion {
                provider: self.provider,
                region: self.region,
            });
        }

        let mut values = self.extra;
        values.insert(PROVIDER.to_string(), self.provider);
        values.insert(REGION.to_string(), self.region);
        values.insert(STAGE.to_string(), self.stage);

        debug!(locators = ?values, "locator info");
        Ok(LocatorSet { values })
    }
}
