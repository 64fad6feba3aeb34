//! # AIML Kernel
//!
//! A compact interpreter for AIML (Artificial Intelligence Markup Language)
//! rule files. It learns categories from disk, matches user input against
//! them, and evaluates the matched templates into replies.
//!
//! ## Core Components
//!
//! - **category**: Pattern/that/topic rules and their parsed templates
//! - **graph**: The word trie categories are matched through
//! - **loader**: AIML document parsing
//! - **session**: Per-conversation predicates and history
//! - **kernel**: Learning, responding, and brain snapshots
//!
//! Only the subset of AIML 1.x used by conversational rule sets is
//! supported; unknown template elements evaluate to their contents.

pub mod category;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod loader;
pub mod normalize;
pub mod session;

pub use category::*;
pub use error::{KernelError, Result};
pub use graph::{GraphMatch, Graphmaster};
pub use kernel::{Kernel, BRAIN_FORMAT_VERSION, VERSION};
pub use session::{Session, DEFAULT_SESSION, MAX_HISTORY};
