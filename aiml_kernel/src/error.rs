//! Error types for the interpreter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while learning rule files or moving brains to and from disk.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed xml in {origin}: {source}")]
    Xml {
        origin: String,
        #[source]
        source: roxmltree::Error,
    },

    #[error("invalid aiml document {origin}: {reason}")]
    InvalidDocument { origin: String, reason: String },

    #[error("unreadable brain file {path}: {source}")]
    Brain {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("brain file {path} has format version {found}, expected {expected}")]
    UnsupportedBrainVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl KernelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KernelError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(origin: &str, reason: impl Into<String>) -> Self {
        KernelError::InvalidDocument {
            origin: origin.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;
