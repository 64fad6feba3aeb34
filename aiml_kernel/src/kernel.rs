//! The interpreter: learns categories and answers input sentences.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::category::{Condition, TemplateNode};
use crate::error::{KernelError, Result};
use crate::graph::Graphmaster;
use crate::loader::parse_document;
use crate::normalize::{collapse_whitespace, last_sentence, normalize, split_sentences, words};
use crate::session::{Session, DEFAULT_SESSION};

/// Reported by `<version/>`.
pub const VERSION: &str = concat!("aiml_kernel ", env!("CARGO_PKG_VERSION"));

/// Version written into every brain file.
pub const BRAIN_FORMAT_VERSION: u32 = 1;

/// Maximum `<srai>` nesting before a sentence is abandoned.
const MAX_RECURSION_DEPTH: usize = 64;

/// Raised internally when `<srai>` nesting runs away.
#[derive(Debug)]
struct RecursionLimit;

type Eval<T> = std::result::Result<T, RecursionLimit>;

#[derive(Serialize)]
struct BrainFileRef<'a> {
    format_version: u32,
    graph: &'a Graphmaster,
    sessions: &'a HashMap<String, Session>,
}

#[derive(Deserialize)]
struct BrainFile {
    format_version: u32,
    graph: Graphmaster,
    #[serde(default)]
    sessions: HashMap<String, Session>,
}

#[derive(Deserialize)]
struct BrainVersion {
    format_version: u32,
}

/// Wildcard captures and session of the category being evaluated.
struct Frame<'s> {
    session: &'s str,
    stars: Vec<String>,
    that_stars: Vec<String>,
    topic_stars: Vec<String>,
    depth: usize,
}

impl Frame<'_> {
    fn capture(list: &[String], index: usize) -> String {
        list.get(index.saturating_sub(1)).cloned().unwrap_or_default()
    }
}

/// An AIML interpreter holding learned categories, sessions and the bot
/// persona.
///
/// Bot predicates are configuration, not memory: they survive
/// [`Kernel::reset_brain`] and are not written to brain files.
#[derive(Debug, Default)]
pub struct Kernel {
    graph: Graphmaster,
    sessions: HashMap<String, Session>,
    bot_predicates: HashMap<String, String>,
}

impl Kernel {
    /// Create an empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn every category of an AIML file. Returns how many were read.
    pub fn learn(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| KernelError::io(path, e))?;
        let count = self.learn_str(&source, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), categories = count, "learned aiml file");
        Ok(count)
    }

    /// Learn every category of an in-memory AIML document. `origin` names
    /// the document in errors.
    pub fn learn_str(&mut self, source: &str, origin: &str) -> Result<usize> {
        let categories = parse_document(source, origin)?;
        let count = categories.len();
        for category in categories {
            self.graph.add(category);
        }
        Ok(count)
    }

    /// Get the total number of learned categories.
    pub fn num_categories(&self) -> usize {
        self.graph.len()
    }

    /// Answer input in the default session.
    pub fn respond(&mut self, input: &str) -> String {
        self.respond_in_session(input, DEFAULT_SESSION)
    }

    /// Answer input in a named session. Each sentence is answered on its
    /// own and the replies are joined.
    pub fn respond_in_session(&mut self, input: &str, session: &str) -> String {
        let mut replies = Vec::new();

        for sentence in split_sentences(input) {
            self.session_mut(session).push_input(sentence.clone());

            let reply = match self.respond_sentence(&sentence, session, 0) {
                Ok(reply) => collapse_whitespace(&reply),
                Err(RecursionLimit) => {
                    tracing::warn!(input = %sentence, "srai recursion limit reached");
                    String::new()
                }
            };

            self.session_mut(session).push_output(reply.clone());
            if !reply.is_empty() {
                replies.push(reply);
            }
        }

        replies.join(" ")
    }

    fn respond_sentence(&mut self, sentence: &str, session: &str, depth: usize) -> Eval<String> {
        if depth > MAX_RECURSION_DEPTH {
            return Err(RecursionLimit);
        }

        let input = words(sentence);
        if input.is_empty() {
            return Ok(String::new());
        }

        let (that, topic) = match self.sessions.get(session) {
            Some(state) => (
                state
                    .output(1)
                    .and_then(last_sentence)
                    .map(|s| words(&s))
                    .unwrap_or_default(),
                words(state.predicate("topic")),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let Some(found) = self.graph.matches(&input, &that, &topic) else {
            tracing::warn!(input = %sentence, "no category matched");
            return Ok(String::new());
        };

        let nodes = found.template.nodes.clone();
        let frame = Frame {
            session,
            stars: found.stars,
            that_stars: found.that_stars,
            topic_stars: found.topic_stars,
            depth,
        };
        self.evaluate(&nodes, &frame)
    }

    fn evaluate(&mut self, nodes: &[TemplateNode], frame: &Frame<'_>) -> Eval<String> {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.evaluate_node(node, frame)?);
        }
        Ok(out)
    }

    fn evaluate_node(&mut self, node: &TemplateNode, frame: &Frame<'_>) -> Eval<String> {
        let value = match node {
            TemplateNode::Text(text) => text.clone(),
            TemplateNode::Star { index } => Frame::capture(&frame.stars, *index),
            TemplateNode::ThatStar { index } => Frame::capture(&frame.that_stars, *index),
            TemplateNode::TopicStar { index } => Frame::capture(&frame.topic_stars, *index),
            TemplateNode::Srai(children) => {
                let redirected = self.evaluate(children, frame)?;
                self.respond_sentence(&redirected, frame.session, frame.depth + 1)?
            }
            TemplateNode::Sr => {
                let star = Frame::capture(&frame.stars, 1);
                self.respond_sentence(&star, frame.session, frame.depth + 1)?
            }
            TemplateNode::Bot { name } => self.bot_predicate(name).unwrap_or_default().to_string(),
            TemplateNode::Get { name } => self.predicate(name, frame.session).unwrap_or_default().to_string(),
            TemplateNode::Set { name, children } => {
                let value = collapse_whitespace(&self.evaluate(children, frame)?);
                self.session_mut(frame.session).set_predicate(name.clone(), value.clone());
                value
            }
            TemplateNode::Think(children) => {
                self.evaluate(children, frame)?;
                String::new()
            }
            TemplateNode::Random(items) => match items.choose(&mut rand::thread_rng()) {
                Some(item) => self.evaluate(item, frame)?,
                None => String::new(),
            },
            TemplateNode::Condition(condition) => self.evaluate_condition(condition, frame)?,
            TemplateNode::Uppercase(children) => self.evaluate(children, frame)?.to_uppercase(),
            TemplateNode::Lowercase(children) => self.evaluate(children, frame)?.to_lowercase(),
            TemplateNode::Formal(children) => self
                .evaluate(children, frame)?
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TemplateNode::Sentence(children) => capitalize_first(self.evaluate(children, frame)?.trim_start()),
            TemplateNode::Input { index } => self
                .sessions
                .get(frame.session)
                .and_then(|s| s.input(*index))
                .unwrap_or_default()
                .to_string(),
            TemplateNode::That { index } => self
                .sessions
                .get(frame.session)
                .and_then(|s| s.output(*index))
                .and_then(last_sentence)
                .unwrap_or_default(),
            TemplateNode::Date => chrono::Local::now().format("%A, %B %-d, %Y").to_string(),
            TemplateNode::Size => self.num_categories().to_string(),
            TemplateNode::Version => VERSION.to_string(),
            TemplateNode::Id => frame.session.to_string(),
            TemplateNode::Group(children) => self.evaluate(children, frame)?,
        };
        Ok(value)
    }

    fn evaluate_condition(&mut self, condition: &Condition, frame: &Frame<'_>) -> Eval<String> {
        match condition {
            Condition::Block { name, value, children } => {
                if self.predicate_matches(name, value, frame.session) {
                    self.evaluate(children, frame)
                } else {
                    Ok(String::new())
                }
            }
            Condition::List { name, items } => {
                let chosen = items.iter().find(|item| match (&item.value, item.name.as_ref().or(name.as_ref())) {
                    (Some(value), Some(name)) => self.predicate_matches(name, value, frame.session),
                    (Some(_), None) => false,
                    (None, _) => true,
                });
                match chosen {
                    Some(item) => self.evaluate(&item.children, frame),
                    None => Ok(String::new()),
                }
            }
        }
    }

    /// `*` matches any non-empty value; otherwise values compare normalized.
    fn predicate_matches(&self, name: &str, expected: &str, session: &str) -> bool {
        let actual = self.predicate(name, session).unwrap_or_default();
        if expected.trim() == "*" {
            return !actual.is_empty();
        }
        normalize(actual) == normalize(expected)
    }

    /// Set a bot persona predicate.
    pub fn set_bot_predicate(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bot_predicates.insert(name.into(), value.into());
    }

    /// Get a bot persona predicate.
    pub fn bot_predicate(&self, name: &str) -> Option<&str> {
        self.bot_predicates.get(name).map(String::as_str)
    }

    /// Get a predicate from a session. Unset predicates read as `None`.
    pub fn predicate(&self, name: &str, session: &str) -> Option<&str> {
        self.sessions
            .get(session)
            .map(|s| s.predicate(name))
            .filter(|v| !v.is_empty())
    }

    fn session_mut(&mut self, session: &str) -> &mut Session {
        self.sessions.entry(session.to_string()).or_default()
    }

    /// Write learned categories and sessions to `path`.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so a failed write never truncates an existing brain.
    pub fn save_brain(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let brain = BrainFileRef {
            format_version: BRAIN_FORMAT_VERSION,
            graph: &self.graph,
            sessions: &self.sessions,
        };
        let bytes = serde_json::to_vec(&brain).map_err(|source| KernelError::Brain {
            path: path.to_path_buf(),
            source,
        })?;

        let staging = path.with_extension("tmp");
        fs::write(&staging, bytes).map_err(|e| KernelError::io(&staging, e))?;
        fs::rename(&staging, path).map_err(|e| KernelError::io(path, e))?;

        tracing::debug!(path = %path.display(), categories = self.graph.len(), "saved brain");
        Ok(())
    }

    /// Replace learned categories and sessions with the contents of `path`.
    pub fn load_brain(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| KernelError::io(path, e))?;
        let corrupt = |source| KernelError::Brain {
            path: path.to_path_buf(),
            source,
        };

        let header: BrainVersion = serde_json::from_str(&source).map_err(corrupt)?;
        if header.format_version != BRAIN_FORMAT_VERSION {
            return Err(KernelError::UnsupportedBrainVersion {
                path: path.to_path_buf(),
                found: header.format_version,
                expected: BRAIN_FORMAT_VERSION,
            });
        }

        let brain: BrainFile = serde_json::from_str(&source).map_err(corrupt)?;
        debug_assert_eq!(brain.format_version, BRAIN_FORMAT_VERSION);
        self.graph = brain.graph;
        self.sessions = brain.sessions;

        tracing::debug!(path = %path.display(), categories = self.graph.len(), "loaded brain");
        Ok(())
    }

    /// Forget learned categories and sessions.
    pub fn reset_brain(&mut self) {
        self.graph = Graphmaster::new();
        self.sessions.clear();
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Upper-case the first character and leave the rest alone.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
