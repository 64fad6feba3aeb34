//! Per-conversation state: predicates plus bounded input/output history.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION: &str = "_global";

/// How many inputs and outputs each session remembers.
pub const MAX_HISTORY: usize = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    predicates: HashMap<String, String>,
    inputs: VecDeque<String>,
    outputs: VecDeque<String>,
}

impl Session {
    /// Get a predicate, empty when unset.
    pub fn predicate(&self, name: &str) -> &str {
        self.predicates.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set_predicate(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.predicates.insert(name.into(), value.into());
    }

    pub fn push_input(&mut self, input: impl Into<String>) {
        Self::push_bounded(&mut self.inputs, input.into());
    }

    pub fn push_output(&mut self, output: impl Into<String>) {
        Self::push_bounded(&mut self.outputs, output.into());
    }

    /// The `index`-th most recent input (1-based).
    pub fn input(&self, index: usize) -> Option<&str> {
        Self::nth_latest(&self.inputs, index)
    }

    /// The `index`-th most recent output (1-based).
    pub fn output(&self, index: usize) -> Option<&str> {
        Self::nth_latest(&self.outputs, index)
    }

    fn push_bounded(history: &mut VecDeque<String>, entry: String) {
        history.push_back(entry);
        while history.len() > MAX_HISTORY {
            history.pop_front();
        }
    }

    fn nth_latest(history: &VecDeque<String>, index: usize) -> Option<&str> {
        let index = index.max(1);
        history
            .len()
            .checked_sub(index)
            .and_then(|i| history.get(i))
            .map(String::as_str)
    }
}
