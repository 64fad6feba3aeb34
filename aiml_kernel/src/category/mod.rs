//! Category module - the unit of knowledge in an AIML brain.
//!
//! A category consists of:
//! - **Pattern**: the words an input sentence must match
//! - **That**: the bot's previous reply the pattern is conditioned on
//! - **Topic**: the conversation topic the pattern is conditioned on
//! - **Template**: how the reply is produced once matched

mod template;

pub use template::*;

use serde::{Deserialize, Serialize};

use crate::normalize::pattern_words;

/// Wildcard used for an omitted `<that>` or topic.
pub const ANY: &str = "*";

/// A single pattern/that/topic → template rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Normalized pattern words, wildcards included.
    pub pattern: Vec<String>,

    /// Normalized `<that>` words.
    pub that: Vec<String>,

    /// Normalized topic words.
    pub topic: Vec<String>,

    pub template: Template,
}

impl Category {
    /// Create a category matching `pattern` in any context.
    pub fn new(pattern: &str, template: Template) -> Self {
        Self {
            pattern: pattern_words(pattern),
            that: vec![ANY.to_string()],
            topic: vec![ANY.to_string()],
            template,
        }
    }

    /// Condition the category on the bot's previous reply.
    pub fn with_that(mut self, that: &str) -> Self {
        let words = pattern_words(that);
        if !words.is_empty() {
            self.that = words;
        }
        self
    }

    /// Condition the category on a topic.
    pub fn with_topic(mut self, topic: &str) -> Self {
        let words = pattern_words(topic);
        if !words.is_empty() {
            self.topic = words;
        }
        self
    }

    /// Whether the pattern has no words left after normalization.
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}
