//! Bot persona predicates set once after the brain is loaded.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::ChatEngine;

/// The year the persona came into being; `age` counts from it.
const PERSONA_BIRTH_YEAR: i32 = 2016;

/// Predicate name → value pairs describing the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityFacts(BTreeMap<String, String>);

impl Default for IdentityFacts {
    fn default() -> Self {
        let age = chrono::Local::now().year() - PERSONA_BIRTH_YEAR;

        Self::empty()
            .with("name", "Mycroft")
            .with("species", "AI")
            .with("genus", "Mycroft")
            .with("family", "virtual personal assistant")
            .with("order", "artificial intelligence")
            .with("class", "computer program")
            .with("kingdom", "machine")
            .with("hometown", "127.0.0.1")
            .with("botmaster", "master")
            .with("master", "the community")
            .with("age", age.to_string())
    }
}

impl IdentityFacts {
    /// A persona with no facts at all.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace a fact.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set every fact as a bot predicate on the engine.
    pub fn apply_to<E: ChatEngine>(&self, engine: &mut E) {
        for (name, value) in self.iter() {
            engine.set_bot_predicate(name, value);
        }
    }
}
