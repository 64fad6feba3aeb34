//! # AIML Solver
//!
//! Conversational fallback for a voice assistant. Answers free-form
//! utterances from AIML rule sets and keeps what it learned across runs in a
//! per-language brain snapshot.
//!
//! ## Core Components
//!
//! - **bot**: Brain lifecycle and periodic persistence for one language
//! - **engine**: The interpreter capability the bot drives
//! - **solver**: The host-facing contract, one bot per language
//! - **identity**: Persona facts exposed to rules as bot predicates
//! - **config** / **paths**: Settings and on-disk layout
//! - **bundled**: Rule sets compiled into the crate
//!
//! ## Design Philosophy
//!
//! - **Recoverable**: Every failure is a [`SolverError`]; nothing here aborts the host
//! - **Replaceable**: The interpreter sits behind [`ChatEngine`]

pub mod bot;
pub mod bundled;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod paths;
pub mod solver;

pub use bot::AimlBot;
pub use config::{SolverConfig, DEFAULT_LANG, DEFAULT_SAVE_LOOP_THRESHOLD};
pub use engine::ChatEngine;
pub use error::{BoxError, Result, SolverError};
pub use identity::IdentityFacts;
pub use paths::{BrainPaths, KnowledgeBase, SNAPSHOT_FILE};
pub use solver::{AimlSolver, BotStatus, Solver, SolverContext};
