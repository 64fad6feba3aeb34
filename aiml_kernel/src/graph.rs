//! Pattern graph - the word trie every category is matched through.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::category::{Category, Template, ANY};

/// Separates pattern words from `<that>` words in a graph path.
const THAT_MARKER: &str = "<THAT>";
/// Separates `<that>` words from topic words in a graph path.
const TOPIC_MARKER: &str = "<TOPIC>";

/// Wildcard tried before exact words.
const UNDERSCORE: &str = "_";

/// Which part of the path a wildcard capture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Pattern,
    That,
    Topic,
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: HashMap<String, Node>,
    /// Index into `Graphmaster::categories`.
    category: Option<usize>,
}

/// Words swallowed by one wildcard, as a range of the search path.
#[derive(Debug, Clone, Copy)]
struct Capture {
    section: Section,
    start: usize,
    end: usize,
}

/// Result of matching an input against the graph.
#[derive(Debug, Clone)]
pub struct GraphMatch<'a> {
    pub template: &'a Template,
    pub stars: Vec<String>,
    pub that_stars: Vec<String>,
    pub topic_stars: Vec<String>,
}

/// The main pattern graph.
///
/// Categories are kept in learning order; the trie is an index over them and
/// is rebuilt from the list when a brain is deserialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoredGraph")]
pub struct Graphmaster {
    categories: Vec<Category>,

    #[serde(skip)]
    root: Node,
}

#[derive(Deserialize)]
struct StoredGraph {
    categories: Vec<Category>,
}

impl From<StoredGraph> for Graphmaster {
    fn from(stored: StoredGraph) -> Self {
        let mut graph = Graphmaster::new();
        for category in stored.categories {
            graph.add(category);
        }
        graph
    }
}

impl Graphmaster {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category. A category with the same pattern, that and topic
    /// replaces the earlier one.
    pub fn add(&mut self, category: Category) {
        let path = Self::path(&category.pattern, &category.that, &category.topic);

        let mut node = &mut self.root;
        for word in path {
            node = node.children.entry(word).or_default();
        }

        match node.category {
            Some(index) => self.categories[index] = category,
            None => {
                node.category = Some(self.categories.len());
                self.categories.push(category);
            }
        }
    }

    /// Match normalized input words in the given `<that>` and topic context.
    pub fn matches(&self, input: &[String], that: &[String], topic: &[String]) -> Option<GraphMatch<'_>> {
        let path = Self::path(input, that, topic);
        let mut captures = Vec::new();
        let index = Self::search(&self.root, &path, 0, Section::Pattern, &mut captures)?;

        let mut found = GraphMatch {
            template: &self.categories[index].template,
            stars: Vec::new(),
            that_stars: Vec::new(),
            topic_stars: Vec::new(),
        };
        for capture in captures {
            let words = path[capture.start..capture.end].join(" ");
            match capture.section {
                Section::Pattern => found.stars.push(words),
                Section::That => found.that_stars.push(words),
                Section::Topic => found.topic_stars.push(words),
            }
        }
        Some(found)
    }

    /// Get the total number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn path(pattern: &[String], that: &[String], topic: &[String]) -> Vec<String> {
        let context = |words: &[String]| {
            if words.is_empty() {
                vec![ANY.to_string()]
            } else {
                words.to_vec()
            }
        };

        let mut path = pattern.to_vec();
        path.push(THAT_MARKER.to_string());
        path.extend(context(that));
        path.push(TOPIC_MARKER.to_string());
        path.extend(context(topic));
        path
    }

    /// Depth-first search in AIML priority order: `_`, exact word, `*`.
    fn search(
        node: &Node,
        path: &[String],
        pos: usize,
        section: Section,
        captures: &mut Vec<Capture>,
    ) -> Option<usize> {
        let Some(word) = path.get(pos) else {
            return node.category;
        };

        if let Some(child) = node.children.get(UNDERSCORE) {
            if let Some(found) = Self::search_wildcard(child, path, pos, section, captures) {
                return Some(found);
            }
        }

        if let Some(child) = node.children.get(word) {
            let next = match word.as_str() {
                THAT_MARKER => Section::That,
                TOPIC_MARKER => Section::Topic,
                _ => section,
            };
            if let Some(found) = Self::search(child, path, pos + 1, next, captures) {
                return Some(found);
            }
        }

        if let Some(child) = node.children.get(ANY) {
            if let Some(found) = Self::search_wildcard(child, path, pos, section, captures) {
                return Some(found);
            }
        }

        None
    }

    /// Let a wildcard swallow one or more words from `start`, shortest
    /// first. A wildcard never crosses into the next section.
    fn search_wildcard(
        child: &Node,
        path: &[String],
        start: usize,
        section: Section,
        captures: &mut Vec<Capture>,
    ) -> Option<usize> {
        for end in start + 1..=path.len() {
            if Self::is_marker(&path[end - 1]) {
                break;
            }

            let mark = captures.len();
            captures.push(Capture { section, start, end });
            if let Some(found) = Self::search(child, path, end, section, captures) {
                return Some(found);
            }
            captures.truncate(mark);
        }
        None
    }

    fn is_marker(word: &str) -> bool {
        word == THAT_MARKER || word == TOPIC_MARKER
    }
}
