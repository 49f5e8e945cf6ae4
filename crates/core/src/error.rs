//! Error kinds surfaced by the loaders and by rule-checked world operations.
//! Load errors are fatal to initialisation; action errors leave state untouched.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{table} references missing key `{key}`")]
    ConfigMissing { table: &'static str, key: String },
    #[error("{table} entry `{key}` is invalid: {reason}")]
    ConfigInvalid { table: &'static str, key: String, reason: String },
    #[error("map malformed at line {line}: {reason}")]
    MapMalformed { line: usize, reason: String },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {document} yaml")]
    Yaml {
        document: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse tuning file")]
    Tuning {
        #[source]
        source: toml::de::Error,
    },
}

impl LoadError {
    pub(crate) fn missing(table: &'static str, key: impl Into<String>) -> Self {
        LoadError::ConfigMissing { table, key: key.into() }
    }

    pub(crate) fn invalid(
        table: &'static str,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        LoadError::ConfigInvalid { table, key: key.into(), reason: reason.into() }
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        LoadError::MapMalformed { line, reason: reason.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    SpellPoints,
    Gold,
    InventorySpace,
    Stock,
    StatPoints,
}

/// Why a world operation was refused. State is unchanged whenever one is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("insufficient {0:?}")]
    InsufficientResources(Resource),
    #[error("{table} has no `{key}`")]
    ConfigMissing { table: &'static str, key: String },
    #[error("no such entity")]
    UnknownEntity,
}

impl ActionError {
    pub(crate) fn not_allowed(reason: impl Into<String>) -> Self {
        ActionError::NotAllowed(reason.into())
    }

    pub(crate) fn missing(table: &'static str, key: impl Into<String>) -> Self {
        ActionError::ConfigMissing { table, key: key.into() }
    }
}
