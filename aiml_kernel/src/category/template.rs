//! Template definitions - the reply side of a category.

use serde::{Deserialize, Serialize};

/// Parsed `<template>` contents.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    pub nodes: Vec<TemplateNode>,
}

impl Template {
    pub fn new(nodes: Vec<TemplateNode>) -> Self {
        Self { nodes }
    }

    /// A template that always answers with fixed text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![TemplateNode::Text(text.into())])
    }
}

/// Elements a template can be built from.
///
/// Indices are 1-based, as written in the rule files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateNode {
    /// Literal text (whitespace already collapsed).
    Text(String),

    /// Words captured by a pattern wildcard.
    Star { index: usize },

    /// Words captured by a `<that>` wildcard.
    ThatStar { index: usize },

    /// Words captured by a topic wildcard.
    TopicStar { index: usize },

    /// Re-submit the evaluated contents as a new input.
    Srai(Vec<TemplateNode>),

    /// Shorthand for `<srai><star/></srai>`.
    Sr,

    /// Bot persona predicate.
    Bot { name: String },

    /// Session predicate lookup.
    Get { name: String },

    /// Session predicate assignment; evaluates to the assigned value.
    Set {
        name: String,
        children: Vec<TemplateNode>,
    },

    /// Evaluate for side effects only.
    Think(Vec<TemplateNode>),

    /// Pick one `<li>` at random.
    Random(Vec<Vec<TemplateNode>>),

    Condition(Condition),

    Uppercase(Vec<TemplateNode>),
    Lowercase(Vec<TemplateNode>),
    /// Capitalize every word.
    Formal(Vec<TemplateNode>),
    /// Capitalize the first letter.
    Sentence(Vec<TemplateNode>),

    /// A previous user input; `1` is the sentence being answered.
    Input { index: usize },

    /// A previous bot reply; `1` is the most recent.
    That { index: usize },

    Date,

    /// Number of learned categories.
    Size,

    Version,

    /// Current session id.
    Id,

    /// Contents of an element the interpreter does not know.
    Group(Vec<TemplateNode>),
}

/// `<condition>` in its two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `<condition name="x" value="y">...</condition>`
    Block {
        name: String,
        value: String,
        children: Vec<TemplateNode>,
    },

    /// `<condition name="x"><li value="y">...</li><li>...</li></condition>`,
    /// or with the name given on each `<li>`.
    List {
        name: Option<String>,
        items: Vec<ConditionItem>,
    },
}

/// One `<li>` of a list condition. An item without a value is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionItem {
    pub name: Option<String>,
    pub value: Option<String>,
    pub children: Vec<TemplateNode>,
}
