//! Pipeline configuration documents
//!
//! Configuration is a YAML mapping. Only top-level keys are interpreted, and only to fold `-`
//! into `_` so `prepare-fast5` and `prepare_fast5` name the same option. Values pass through
//! untouched to the root jobs.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Fold raw keys into canonical option names
pub mod normalize;
/// Advisory JSON schema check of documented options
pub mod schema;

pub use normalize::{canonical_key, normalize};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} not found, run {command}", path.display())]
    ConfigNotFound { path: PathBuf, command: &'static str },

    #[error("Can't read config {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Can't parse config {}: {source}", path.display())]
    ConfigParseError { path: PathBuf, source: DocumentError },

    #[error("Invalid value {value} for option '{key}'")]
    InvalidOption { key: String, value: String },
}

/// Why a config document isn't a usable option set
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("top level of the document is not a mapping")]
    NotAMapping,

    #[error("top-level key {0} is not a string")]
    NonStringKey(String),

    #[error("option '{key}': {source}")]
    Value { key: String, source: serde_json::Error },
}

/// Canonical option set: every key uses `_`, never `-`
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Config {
    options: BTreeMap<String, Value>,
}

impl Config {
    /// Read and normalize the YAML document at `path`
    ///
    /// `command` names the subcommand that generates a starting config, for the not-found hint.
    pub fn load(path: &Path, command: &'static str) -> Result<Config, ConfigError> {
        info!("Reading config at {}", path.display());
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::ConfigNotFound { path: path.to_path_buf(), command },
            _ => ConfigError::Io { path: path.to_path_buf(), source: err },
        })?;

        Config::from_yaml(&text).map_err(|source| ConfigError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a YAML document. An empty document is an empty config.
    pub fn from_yaml(text: &str) -> Result<Config, DocumentError> {
        let document: serde_yaml::Value = serde_yaml::from_str(text)?;
        let mapping = match document {
            serde_yaml::Value::Null => return Ok(Config::default()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            _ => return Err(DocumentError::NotAMapping),
        };

        let mut raw: Vec<(String, Value)> = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let key = match key {
                serde_yaml::Value::String(key) => key,
                other => return Err(DocumentError::NonStringKey(format!("{other:?}"))),
            };
            let value = match serde_json::to_value(&value) {
                Ok(value) => value,
                Err(source) => return Err(DocumentError::Value { key, source }),
            };
            raw.push((key, value));
        }

        Ok(normalize(raw))
    }

    pub(crate) fn from_canonical(options: BTreeMap<String, Value>) -> Config {
        Config { options }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(&canonical_key(key))
    }

    /// `None` when the option is missing, null or not a boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The whole option set as one JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.options.clone().into_iter().collect())
    }
}
