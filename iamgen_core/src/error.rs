use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IamGenError>;

/// Failure to render a name. Always fatal: a broken locator set makes every
/// derived name untrustworthy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("locator \"{key}\" is required by the {template} template but was not supplied")]
    MissingLocator { key: String, template: &'static str },
}

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("stage {0} not supported")]
    UnsupportedStage(String),

    #[error("provider {0} not supported")]
    UnsupportedProvider(String),

    #[error("region {region} not supported for provider {provider}")]
    UnsupportedRegion { provider: String, region: String },

    #[error("locator argument \"{0}\" malformed")]
    MalformedBinding(String),

    #[error("locator {key} has a non-string value in {path}")]
    NonStringValue { key: String, path: PathBuf },

    #[error("failed to read locators file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse locators file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Error)]
pub enum IamGenError {
    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("Locator error: {0}")]
    Locator(#[from] LocatorError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
