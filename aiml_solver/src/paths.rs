//! Where rules are read from and brain snapshots are written to.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SolverConfig;
use crate::error::{Result, SolverError};

/// Directory name of the user data layout and of bundled rule origins.
pub const AIML_DIR: &str = "aiml";

pub const SNAPSHOT_FILE: &str = "bot_brain.brn";

/// Source of one language's rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeBase {
    /// `*.aiml` files in a directory.
    Directory(PathBuf),
    /// Rules compiled into the crate for a language.
    Bundled(String),
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnowledgeBase::Directory(dir) => write!(f, "directory {}", dir.display()),
            KnowledgeBase::Bundled(lang) => write!(f, "bundled rules for '{lang}'"),
        }
    }
}

impl From<PathBuf> for KnowledgeBase {
    fn from(dir: PathBuf) -> Self {
        KnowledgeBase::Directory(dir)
    }
}

impl From<&Path> for KnowledgeBase {
    fn from(dir: &Path) -> Self {
        KnowledgeBase::Directory(dir.to_path_buf())
    }
}

impl From<&PathBuf> for KnowledgeBase {
    fn from(dir: &PathBuf) -> Self {
        KnowledgeBase::Directory(dir.clone())
    }
}

/// Rule source and snapshot file of one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainPaths {
    /// `<knowledge root>/<lang>`, or the bundled rules
    pub knowledge_base: KnowledgeBase,

    /// `<data root>/aiml/<lang>/bot_brain.brn`
    pub snapshot: PathBuf,
}

impl BrainPaths {
    pub fn new(knowledge_base: impl Into<KnowledgeBase>, snapshot: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_base: knowledge_base.into(),
            snapshot: snapshot.into(),
        }
    }

    /// Compute both locations for `lang` from the configuration.
    pub fn resolve(config: &SolverConfig, lang: &str) -> Result<Self> {
        let lang = normalize_lang(lang)?;

        let knowledge_base = match &config.knowledge_base_dir {
            Some(root) => KnowledgeBase::Directory(root.join(&lang)),
            None => KnowledgeBase::Bundled(lang.clone()),
        };

        Ok(Self {
            knowledge_base,
            snapshot: Self::data_root(config)
                .join(AIML_DIR)
                .join(&lang)
                .join(SNAPSHOT_FILE),
        })
    }

    /// Configured data root, else the platform data directory, else `.`.
    pub fn data_root(config: &SolverConfig) -> PathBuf {
        config
            .data_dir
            .clone()
            .or_else(dirs::data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Language codes become path components, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_lang(lang: &str) -> Result<()> {
    let valid = !lang.is_empty()
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SolverError::UnsupportedLanguage(lang.to_string()))
    }
}

/// Validate a language code and fold it to the lower-case form used for
/// bot keys and paths.
pub fn normalize_lang(lang: &str) -> Result<String> {
    validate_lang(lang)?;
    Ok(lang.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_layout() {
        let config = SolverConfig::default()
            .with_data_dir("/home/user/.local/share")
            .with_knowledge_base_dir("/opt/rules");

        let paths = BrainPaths::resolve(&config, "en-us").unwrap();
        assert_eq!(
            paths.knowledge_base,
            KnowledgeBase::Directory(PathBuf::from("/opt/rules/en-us"))
        );
        assert_eq!(
            paths.snapshot,
            PathBuf::from("/home/user/.local/share/aiml/en-us/bot_brain.brn")
        );
    }

    #[test]
    fn test_default_knowledge_base_is_bundled() {
        let config = SolverConfig::default().with_data_dir("/tmp/data");
        let paths = BrainPaths::resolve(&config, "pt-pt").unwrap();
        assert_eq!(paths.knowledge_base, KnowledgeBase::Bundled("pt-pt".to_string()));
    }

    #[test]
    fn test_resolve_folds_case() {
        let config = SolverConfig::default()
            .with_data_dir("/data")
            .with_knowledge_base_dir("/rules");

        let paths = BrainPaths::resolve(&config, "pt-PT").unwrap();
        assert_eq!(paths.knowledge_base, KnowledgeBase::Directory(PathBuf::from("/rules/pt-pt")));
        assert_eq!(paths.snapshot, PathBuf::from("/data/aiml/pt-pt/bot_brain.brn"));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let config = SolverConfig::default();
        assert!(matches!(
            BrainPaths::resolve(&config, "../../etc"),
            Err(SolverError::UnsupportedLanguage(_))
        ));
        assert!(validate_lang("").is_err());
        assert!(validate_lang("pt_BR").is_ok());
        assert_eq!(normalize_lang("pt_BR").unwrap(), "pt_br");
    }

    #[test]
    fn test_knowledge_base_display() {
        assert_eq!(
            KnowledgeBase::Bundled("en-us".to_string()).to_string(),
            "bundled rules for 'en-us'"
        );
        assert_eq!(
            KnowledgeBase::from(Path::new("/opt/rules/en-us")).to_string(),
            "directory /opt/rules/en-us"
        );
    }
}
