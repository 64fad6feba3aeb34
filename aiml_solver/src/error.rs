//! Error taxonomy for the solver. None of these are fatal to the host.

use std::path::PathBuf;
use thiserror::Error;

use crate::paths::KnowledgeBase;

/// Engine errors are carried opaquely so any [`crate::ChatEngine`] fits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("knowledge base {0} does not exist")]
    KnowledgeBaseMissing(KnowledgeBase),

    #[error("cannot list knowledge base directory {path}: {source}")]
    KnowledgeBaseUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule file {path} could not be learned: {source}")]
    RuleFileInvalid {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("brain snapshot {path} is unreadable or corrupt: {source}")]
    SnapshotCorrupt {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to write brain snapshot {path}: {source}")]
    SnapshotWriteFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to remove brain snapshot {path}: {source}")]
    SnapshotRemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("brain is not loaded")]
    NotLoaded,

    #[error("unsupported language code '{0}'")]
    UnsupportedLanguage(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, SolverError>;
