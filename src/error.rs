use thiserror::Error;

use crate::config::ConfigError;
use crate::manifest::ManifestError;

/// Problems with files the user supplied
///
/// These are reported as a plain message and exit status 1. Anything else is an internal or
/// engine failure and terminates with the full error chain.
#[derive(Error, Debug)]
pub enum UserInputError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
