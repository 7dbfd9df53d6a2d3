//! Error types for the iamgen CLI.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    IamGen(#[from] iamgen_core::IamGenError),

    #[error("Locator error: {0}")]
    Locator(#[from] iamgen_core::LocatorError),

    #[error("I/O error on {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} diagnostic(s) reported in strict mode")]
    Strict(usize),
}
