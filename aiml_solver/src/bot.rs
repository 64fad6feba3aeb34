//! The bot adapter: brain lifecycle and periodic persistence around a
//! [`ChatEngine`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::bundled;
use crate::config::SolverConfig;
use crate::engine::ChatEngine;
use crate::error::{BoxError, Result, SolverError};
use crate::identity::IdentityFacts;
use crate::paths::{BrainPaths, KnowledgeBase, AIML_DIR};

/// Extension of the rule files learned from the knowledge base directory.
const RULE_FILE_EXTENSION: &str = "aiml";

/// One language's bot: an engine plus where its brain lives.
///
/// The adapter is single-caller; share it through
/// [`crate::AimlSolver`], which serializes access.
pub struct AimlBot<E> {
    engine: E,
    paths: BrainPaths,
    identity: IdentityFacts,
    save_loop_threshold: u64,
    /// Starts at 1; never persisted.
    line_count: u64,
    loaded: bool,
}

impl<E: ChatEngine> AimlBot<E> {
    /// Create an unloaded bot. A zero threshold is treated as 1.
    pub fn new(engine: E, paths: BrainPaths, identity: IdentityFacts, save_loop_threshold: u32) -> Self {
        Self {
            engine,
            paths,
            identity,
            save_loop_threshold: u64::from(save_loop_threshold.max(1)),
            line_count: 1,
            loaded: false,
        }
    }

    /// Create an unloaded bot for `lang` from the configuration.
    pub fn from_config(engine: E, config: &SolverConfig, lang: &str) -> Result<Self> {
        config.validate()?;
        let paths = BrainPaths::resolve(config, lang)?;
        Ok(Self::new(
            engine,
            paths,
            config.identity.clone(),
            config.save_loop_threshold,
        ))
    }

    /// Load the brain snapshot, or learn the knowledge base and write a
    /// fresh snapshot when there is none. Then apply the identity facts.
    ///
    /// Does nothing when the brain is already loaded.
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            tracing::debug!("Brain already loaded");
            return Ok(());
        }

        tracing::info!(snapshot = %self.paths.snapshot.display(), "Loading brain");
        if self.paths.snapshot.is_file() {
            self.engine
                .load_brain(&self.paths.snapshot)
                .map_err(|e| SolverError::SnapshotCorrupt {
                    path: self.paths.snapshot.clone(),
                    source: Box::new(e),
                })?;
        } else {
            self.learn_knowledge_base()?;
            self.persist()?;
        }

        self.identity.apply_to(&mut self.engine);
        self.loaded = true;
        Ok(())
    }

    fn learn_knowledge_base(&mut self) -> Result<usize> {
        match self.paths.knowledge_base.clone() {
            KnowledgeBase::Directory(dir) => self.learn_directory(&dir),
            KnowledgeBase::Bundled(lang) => self.learn_bundled(&lang),
        }
    }

    fn learn_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(SolverError::KnowledgeBaseMissing(dir.into()));
        }

        let unreadable = |source| SolverError::KnowledgeBaseUnreadable {
            path: dir.to_path_buf(),
            source,
        };
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == RULE_FILE_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "Knowledge base has no rule files");
        }

        let mut rules = 0;
        for file in &files {
            rules += self
                .engine
                .learn(file)
                .map_err(|e| SolverError::RuleFileInvalid {
                    path: file.clone(),
                    source: Box::new(e),
                })?;
        }

        tracing::info!(dir = %dir.display(), files = files.len(), rules, "Learned knowledge base");
        Ok(rules)
    }

    fn learn_bundled(&mut self, lang: &str) -> Result<usize> {
        let files = bundled::rules(lang)
            .ok_or_else(|| SolverError::KnowledgeBaseMissing(KnowledgeBase::Bundled(lang.to_string())))?;

        let mut rules = 0;
        for file in files {
            let origin = Path::new(AIML_DIR).join(lang).join(file.name);
            rules += self
                .engine
                .learn_str(file.source, &origin.display().to_string())
                .map_err(|e| SolverError::RuleFileInvalid {
                    path: origin.clone(),
                    source: Box::new(e),
                })?;
        }

        tracing::info!(lang, files = files.len(), rules, "Learned bundled knowledge base");
        Ok(rules)
    }

    /// Answer an utterance. Every `save_loop_threshold`-th call also
    /// rewrites the snapshot.
    ///
    /// Returns `None` when the engine has nothing to say. A failed periodic
    /// save is logged and the reply is still returned; [`AimlBot::save`]
    /// reports the error.
    pub fn ask(&mut self, utterance: &str) -> Result<Option<String>> {
        if !self.loaded {
            return Err(SolverError::NotLoaded);
        }

        let response = self.engine.respond(utterance);

        let save_due = self.line_count % self.save_loop_threshold == 0;
        self.line_count += 1;
        if save_due {
            tracing::debug!(line = self.line_count - 1, "Periodic brain save");
            if let Err(err) = self.persist() {
                tracing::warn!(error = %err, "Periodic brain save failed");
            }
        }

        Ok(Some(response).filter(|r| !r.is_empty()))
    }

    /// Write the snapshot now.
    pub fn save(&self) -> Result<()> {
        if !self.loaded {
            return Err(SolverError::NotLoaded);
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let path = &self.paths.snapshot;
        let failed = |source: BoxError| SolverError::SnapshotWriteFailed {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| failed(Box::new(e)))?;
        }
        self.engine
            .save_brain(path)
            .map_err(|e| failed(Box::new(e)))
    }

    /// Delete the snapshot and forget everything. The next load relearns
    /// the knowledge base.
    pub fn reset(&mut self) -> Result<()> {
        tracing::info!(snapshot = %self.paths.snapshot.display(), "Deleting brain file");
        match fs::remove_file(&self.paths.snapshot) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SolverError::SnapshotRemoveFailed {
                    path: self.paths.snapshot.clone(),
                    source,
                })
            }
        }
        self.soft_reset();
        Ok(())
    }

    /// Forget in-memory state only; the snapshot stays on disk.
    pub fn soft_reset(&mut self) {
        self.engine.reset_brain();
        self.loaded = false;
    }

    /// Persist and unload, if loaded.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.loaded {
            return Ok(());
        }
        self.persist()?;
        self.engine.reset_brain();
        self.loaded = false;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Value the next `ask` will be counted as.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn paths(&self) -> &BrainPaths {
        &self.paths
    }

    pub fn identity(&self) -> &IdentityFacts {
        &self.identity
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::FakeEngine;
    use aiml_kernel::Kernel;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        kb: PathBuf,
        paths: BrainPaths,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let kb = tmp.path().join("rules").join("en-us");
        fs::create_dir_all(&kb).unwrap();
        fs::write(
            kb.join("a_greetings.aiml"),
            r#"<aiml>
  <category><pattern>HELLO</pattern><template>Hi there!</template></category>
  <category><pattern>WHAT IS YOUR NAME</pattern><template>I am <bot name="name"/>.</template></category>
</aiml>"#,
        )
        .unwrap();
        fs::write(
            kb.join("b_memory.aiml"),
            r#"<aiml>
  <category><pattern>MY NAME IS *</pattern><template><think><set name="name"><star/></set></think>Noted.</template></category>
  <category><pattern>WHO AM I</pattern><template><get name="name"/></template></category>
</aiml>"#,
        )
        .unwrap();
        fs::write(kb.join("README.md"), "not a rule file").unwrap();

        let paths = BrainPaths::new(&kb, tmp.path().join("data").join("aiml").join("en-us").join("bot_brain.brn"));
        Fixture { _tmp: tmp, kb, paths }
    }

    fn fake_bot(fx: &Fixture, threshold: u32) -> AimlBot<FakeEngine> {
        AimlBot::new(FakeEngine::default(), fx.paths.clone(), IdentityFacts::default(), threshold)
    }

    fn kernel_bot(fx: &Fixture) -> AimlBot<Kernel> {
        AimlBot::new(Kernel::new(), fx.paths.clone(), IdentityFacts::default(), 4)
    }

    #[test]
    fn test_first_load_learns_and_writes_snapshot() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        assert!(!fx.paths.snapshot.exists());

        bot.load().unwrap();

        assert!(bot.is_loaded());
        assert!(fx.paths.snapshot.is_file());
        assert_eq!(bot.engine().learned.len(), 2);
        assert!(bot.engine().learned[0].ends_with("a_greetings.aiml"));
        assert_eq!(bot.engine().saves.get(), 1);
        assert_eq!(bot.engine().loads, 0);
    }

    #[test]
    fn test_existing_snapshot_takes_precedence() {
        let fx = fixture();
        fake_bot(&fx, 4).load().unwrap();

        let mut bot = fake_bot(&fx, 4);
        bot.load().unwrap();

        assert!(bot.engine().learned.is_empty());
        assert_eq!(bot.engine().loads, 1);
        assert_eq!(bot.engine().saves.get(), 0);
    }

    #[test]
    fn test_load_is_idempotent() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        bot.load().unwrap();
        bot.load().unwrap();

        assert_eq!(bot.engine().learned.len(), 2);
        assert_eq!(bot.engine().saves.get(), 1);
    }

    #[test]
    fn test_ask_before_load() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        assert!(matches!(bot.ask("hello"), Err(SolverError::NotLoaded)));
        assert_eq!(bot.line_count(), 1);
    }

    #[test]
    fn test_save_loop_threshold() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        bot.load().unwrap();
        let after_load = bot.engine().saves.get();

        for _ in 0..3 {
            bot.ask("hello").unwrap();
        }
        assert_eq!(bot.engine().saves.get(), after_load);

        bot.ask("hello").unwrap();
        assert_eq!(bot.engine().saves.get(), after_load + 1);

        for _ in 0..4 {
            bot.ask("hello").unwrap();
        }
        assert_eq!(bot.engine().saves.get(), after_load + 2);
        assert_eq!(bot.line_count(), 9);
    }

    #[test]
    fn test_threshold_of_one_saves_every_time() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 1);
        bot.load().unwrap();

        bot.ask("a").unwrap();
        bot.ask("b").unwrap();
        assert_eq!(bot.engine().saves.get(), 3);
    }

    #[test]
    fn test_empty_response_is_none() {
        let fx = fixture();
        let mut bot = AimlBot::new(FakeEngine::silent(), fx.paths.clone(), IdentityFacts::empty(), 4);
        bot.load().unwrap();

        assert_eq!(bot.ask("anything").unwrap(), None);
    }

    #[test]
    fn test_reset_removes_snapshot_and_unloads() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        bot.load().unwrap();

        bot.reset().unwrap();

        assert!(!fx.paths.snapshot.exists());
        assert!(!bot.is_loaded());
        assert_eq!(bot.engine().resets, 1);
        assert!(matches!(bot.ask("hello"), Err(SolverError::NotLoaded)));

        bot.load().unwrap();
        assert_eq!(bot.engine().learned.len(), 4);
        assert!(fx.paths.snapshot.is_file());
    }

    #[test]
    fn test_reset_without_snapshot() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        assert!(bot.reset().is_ok());
    }

    #[test]
    fn test_soft_reset_keeps_snapshot() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);
        bot.load().unwrap();

        bot.soft_reset();
        assert!(!bot.is_loaded());
        assert!(fx.paths.snapshot.is_file());

        bot.load().unwrap();
        assert_eq!(bot.engine().loads, 1);
        assert_eq!(bot.engine().learned.len(), 2);
    }

    #[test]
    fn test_shutdown_persists_and_unloads() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 4);

        bot.shutdown().unwrap();
        assert_eq!(bot.engine().saves.get(), 0);

        bot.load().unwrap();
        bot.shutdown().unwrap();
        assert_eq!(bot.engine().saves.get(), 2);
        assert_eq!(bot.engine().resets, 1);
        assert!(!bot.is_loaded());
    }

    #[test]
    fn test_missing_knowledge_base() {
        let fx = fixture();
        let paths = BrainPaths::new(fx.kb.join("nope"), fx.paths.snapshot.clone());
        let mut bot = AimlBot::new(FakeEngine::default(), paths, IdentityFacts::default(), 4);

        assert!(matches!(bot.load(), Err(SolverError::KnowledgeBaseMissing(_))));
        assert!(!bot.is_loaded());
        assert!(!fx.paths.snapshot.exists());
    }

    #[test]
    fn test_corrupt_snapshot() {
        let fx = fixture();
        fs::create_dir_all(fx.paths.snapshot.parent().unwrap()).unwrap();
        fs::write(&fx.paths.snapshot, "garbage").unwrap();

        let mut bot = fake_bot(&fx, 4);
        assert!(matches!(bot.load(), Err(SolverError::SnapshotCorrupt { .. })));
        assert!(!bot.is_loaded());
    }

    #[test]
    fn test_invalid_rule_file() {
        let fx = fixture();
        fs::write(fx.kb.join("c_broken.aiml"), "<aiml><category>").unwrap();

        let mut bot = kernel_bot(&fx);
        let err = bot.load().unwrap_err();
        assert!(matches!(err, SolverError::RuleFileInvalid { ref path, .. } if path.ends_with("c_broken.aiml")));
    }

    #[test]
    fn test_identity_facts_survive_sessions() {
        let fx = fixture();
        let mut bot = kernel_bot(&fx);
        bot.load().unwrap();
        assert_eq!(bot.ask("what is your name").unwrap().as_deref(), Some("I am Mycroft."));
        bot.shutdown().unwrap();

        let mut next = kernel_bot(&fx);
        next.load().unwrap();
        assert_eq!(next.engine().bot_predicate("name"), Some("Mycroft"));
        assert_eq!(next.ask("what is your name").unwrap().as_deref(), Some("I am Mycroft."));
    }

    #[test]
    fn test_periodic_save_persists_conversation() {
        let fx = fixture();
        let mut bot = kernel_bot(&fx);
        bot.load().unwrap();

        bot.ask("my name is ada").unwrap();
        bot.ask("hello").unwrap();
        bot.ask("hello").unwrap();

        let mut reloaded = Kernel::new();
        reloaded.load_brain(&fx.paths.snapshot).unwrap();
        assert_eq!(reloaded.predicate("name", aiml_kernel::DEFAULT_SESSION), None);

        bot.ask("hello").unwrap();

        let mut reloaded = Kernel::new();
        reloaded.load_brain(&fx.paths.snapshot).unwrap();
        assert_eq!(reloaded.predicate("name", aiml_kernel::DEFAULT_SESSION), Some("ADA"));
    }

    #[test]
    fn test_bundled_knowledge_base() {
        let fx = fixture();
        let paths = BrainPaths::new(KnowledgeBase::Bundled("en-us".to_string()), fx.paths.snapshot.clone());
        let mut bot = AimlBot::new(Kernel::new(), paths, IdentityFacts::default(), 4);

        bot.load().unwrap();
        assert!(fx.paths.snapshot.is_file());
        assert_eq!(
            bot.ask("what is your name").unwrap().as_deref(),
            Some("My name is Mycroft.")
        );
    }

    #[test]
    fn test_unknown_bundled_language() {
        let fx = fixture();
        let paths = BrainPaths::new(KnowledgeBase::Bundled("xx-yy".to_string()), fx.paths.snapshot.clone());
        let mut bot = AimlBot::new(FakeEngine::default(), paths, IdentityFacts::default(), 4);

        assert!(matches!(
            bot.load(),
            Err(SolverError::KnowledgeBaseMissing(KnowledgeBase::Bundled(ref lang))) if lang == "xx-yy"
        ));
    }

    #[test]
    fn test_load_fails_when_snapshot_dir_is_a_file() {
        let fx = fixture();
        let parent = fx.paths.snapshot.parent().unwrap();
        fs::create_dir_all(parent.parent().unwrap()).unwrap();
        fs::write(parent, "not a directory").unwrap();

        let mut bot = fake_bot(&fx, 4);
        assert!(matches!(bot.load(), Err(SolverError::SnapshotWriteFailed { .. })));
        assert!(!bot.is_loaded());
    }

    #[test]
    fn test_failed_periodic_save_keeps_reply() {
        let fx = fixture();
        let mut bot = fake_bot(&fx, 2);
        bot.load().unwrap();

        let parent = fx.paths.snapshot.parent().unwrap();
        fs::remove_dir_all(parent).unwrap();
        fs::write(parent, "not a directory").unwrap();

        assert_eq!(bot.ask("one").unwrap().as_deref(), Some("echo: one"));
        assert_eq!(bot.ask("two").unwrap().as_deref(), Some("echo: two"));
        assert_eq!(bot.line_count(), 3);
        assert_eq!(bot.engine().saves.get(), 1);

        assert!(matches!(bot.save(), Err(SolverError::SnapshotWriteFailed { .. })));
    }

    #[test]
    fn test_reset_fails_when_snapshot_is_a_directory() {
        let fx = fixture();
        fs::create_dir_all(&fx.paths.snapshot).unwrap();

        let mut bot = fake_bot(&fx, 4);
        assert!(matches!(bot.reset(), Err(SolverError::SnapshotRemoveFailed { .. })));
        assert!(fx.paths.snapshot.is_dir());
    }
}
