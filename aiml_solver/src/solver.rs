//! The host-facing solver contract and its AIML implementation.

use aiml_kernel::Kernel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::bot::AimlBot;
use crate::config::SolverConfig;
use crate::engine::ChatEngine;
use crate::error::{Result, SolverError};
use crate::paths::normalize_lang;

/// What the host framework calls to get an answer.
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;

    /// Answer `query`, or `None` when the solver has nothing to say.
    fn get_spoken_answer(&self, query: &str, context: Option<&SolverContext>) -> Result<Option<String>>;
}

/// Per-query hints from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverContext {
    #[serde(default)]
    pub lang: Option<String>,
}

impl SolverContext {
    pub fn with_lang(lang: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
        }
    }
}

/// Snapshot of one language bot, for host diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotStatus {
    pub lang: String,
    pub loaded: bool,
    pub line_count: u64,
}

type EngineFactory<E> = Box<dyn Fn() -> E + Send + Sync>;

/// AIML solver holding one bot per language.
///
/// All bots sit behind one mutex, so concurrent host threads never race on
/// a save counter or a snapshot file.
pub struct AimlSolver<E: ChatEngine = Kernel> {
    config: SolverConfig,
    factory: EngineFactory<E>,
    bots: Mutex<HashMap<String, AimlBot<E>>>,
}

impl AimlSolver<Kernel> {
    /// Create the solver and load the default language's brain.
    pub fn new(config: SolverConfig) -> Result<Self> {
        Self::with_engine_factory(config, Kernel::new)
    }
}

impl<E: ChatEngine> AimlSolver<E> {
    pub const NAME: &'static str = "AIML";

    /// Create the solver with a custom engine per language, and load the
    /// default language's brain.
    pub fn with_engine_factory(
        mut config: SolverConfig,
        factory: impl Fn() -> E + Send + Sync + 'static,
    ) -> Result<Self> {
        config.validate()?;
        config.lang = normalize_lang(&config.lang)?;
        let solver = Self {
            config,
            factory: Box::new(factory),
            bots: Mutex::new(HashMap::new()),
        };

        {
            let mut bots = solver.bots.lock();
            solver.bot_for(&mut bots, &solver.config.lang)?.load()?;
        }
        Ok(solver)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn bot_for<'a>(
        &self,
        bots: &'a mut HashMap<String, AimlBot<E>>,
        lang: &str,
    ) -> Result<&'a mut AimlBot<E>> {
        match bots.entry(lang.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let bot = AimlBot::from_config((self.factory)(), &self.config, lang)?;
                Ok(entry.insert(bot))
            }
        }
    }

    fn resolve_lang(&self, context: Option<&SolverContext>) -> Result<String> {
        normalize_lang(
            context
                .and_then(|c| c.lang.as_deref())
                .unwrap_or(&self.config.lang),
        )
    }

    /// Delete the snapshot of `lang` and unload it.
    pub fn reset(&self, lang: &str) -> Result<()> {
        let lang = normalize_lang(lang)?;
        let mut bots = self.bots.lock();
        self.bot_for(&mut bots, &lang)?.reset()
    }

    /// Unload `lang` without touching its snapshot.
    pub fn soft_reset(&self, lang: &str) {
        let Ok(lang) = normalize_lang(lang) else {
            return;
        };
        if let Some(bot) = self.bots.lock().get_mut(&lang) {
            bot.soft_reset();
        }
    }

    /// Persist and unload every bot. Every bot is attempted; the first
    /// failure is returned.
    pub fn shutdown(&self) -> Result<()> {
        let mut first_error: Option<SolverError> = None;
        for (lang, bot) in self.bots.lock().iter_mut() {
            if let Err(err) = bot.shutdown() {
                tracing::warn!(lang = %lang, error = %err, "Failed to persist brain on shutdown");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Status of every bot created so far, ordered by language.
    pub fn status(&self) -> Vec<BotStatus> {
        let bots = self.bots.lock();
        let mut status: Vec<BotStatus> = bots
            .iter()
            .map(|(lang, bot)| BotStatus {
                lang: lang.clone(),
                loaded: bot.is_loaded(),
                line_count: bot.line_count(),
            })
            .collect();
        status.sort_by(|a, b| a.lang.cmp(&b.lang));
        status
    }
}

impl<E: ChatEngine> Solver for AimlSolver<E> {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_spoken_answer(&self, query: &str, context: Option<&SolverContext>) -> Result<Option<String>> {
        let lang = self.resolve_lang(context)?;
        let mut bots = self.bots.lock();
        let bot = self.bot_for(&mut bots, &lang)?;
        bot.load()?;
        bot.ask(query)
    }
}
