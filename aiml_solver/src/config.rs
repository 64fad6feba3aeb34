//! Solver configuration.
//!
//! Read from a TOML file. Every key is optional:
//!
//! ```toml
//! lang = "en-us"
//! save_loop_threshold = 4
//! knowledge_base_dir = "/opt/aiml"
//! data_dir = "/var/lib/assistant"
//!
//! [identity]
//! name = "Mycroft"
//! ```
//!
//! An `[identity]` table replaces the default persona as a whole.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SolverError};
use crate::identity::IdentityFacts;
use crate::paths::validate_lang;

pub const DEFAULT_LANG: &str = "en-us";

/// Utterances between automatic brain saves.
pub const DEFAULT_SAVE_LOOP_THRESHOLD: u32 = 4;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Language used when the host gives none.
    pub lang: String,

    pub save_loop_threshold: u32,

    /// Root holding one rule directory per language. Defaults to the rules
    /// compiled into the crate.
    pub knowledge_base_dir: Option<PathBuf>,

    /// User data root for brain snapshots. Defaults to the platform data
    /// directory.
    pub data_dir: Option<PathBuf>,

    pub identity: IdentityFacts,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            save_loop_threshold: DEFAULT_SAVE_LOOP_THRESHOLD,
            knowledge_base_dir: None,
            data_dir: None,
            identity: IdentityFacts::default(),
        }
    }
}

impl SolverConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Self::parse(source, "<inline>")
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No solver config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SolverError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&source, &path.display().to_string())
    }

    fn parse(source: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|source| SolverError::ConfigParse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the adapter cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.save_loop_threshold == 0 {
            return Err(SolverError::InvalidConfig(
                "save_loop_threshold must be at least 1".to_string(),
            ));
        }
        validate_lang(&self.lang)
    }

    /// Builder-style override of the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Builder-style override of the knowledge base root.
    pub fn with_knowledge_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.knowledge_base_dir = Some(dir.into());
        self
    }

    pub fn with_save_loop_threshold(mut self, threshold: u32) -> Self {
        self.save_loop_threshold = threshold;
        self
    }
}
