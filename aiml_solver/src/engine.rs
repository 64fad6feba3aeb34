//! The chat engine capability the bot adapter drives.

use aiml_kernel::{Kernel, KernelError};
use std::path::Path;

/// Everything the adapter needs from an interpreter.
///
/// Implemented for [`aiml_kernel::Kernel`]; tests substitute a fake.
pub trait ChatEngine: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Learn one rule file, returning the number of rules read.
    fn learn(&mut self, path: &Path) -> Result<usize, Self::Error>;

    /// Learn an in-memory rule document. `origin` names it in errors.
    fn learn_str(&mut self, source: &str, origin: &str) -> Result<usize, Self::Error>;

    /// Answer one utterance. An empty string means no answer.
    fn respond(&mut self, input: &str) -> String;

    fn save_brain(&self, path: &Path) -> Result<(), Self::Error>;

    fn load_brain(&mut self, path: &Path) -> Result<(), Self::Error>;

    /// Forget learned rules and conversation state.
    fn reset_brain(&mut self);

    fn set_bot_predicate(&mut self, name: &str, value: &str);

    fn bot_predicate(&self, name: &str) -> Option<String>;
}

impl ChatEngine for Kernel {
    type Error = KernelError;

    fn learn(&mut self, path: &Path) -> Result<usize, KernelError> {
        Kernel::learn(self, path)
    }

    fn learn_str(&mut self, source: &str, origin: &str) -> Result<usize, KernelError> {
        Kernel::learn_str(self, source, origin)
    }

    fn respond(&mut self, input: &str) -> String {
        Kernel::respond(self, input)
    }

    fn save_brain(&self, path: &Path) -> Result<(), KernelError> {
        Kernel::save_brain(self, path)
    }

    fn load_brain(&mut self, path: &Path) -> Result<(), KernelError> {
        Kernel::load_brain(self, path)
    }

    fn reset_brain(&mut self) {
        Kernel::reset_brain(self)
    }

    fn set_bot_predicate(&mut self, name: &str, value: &str) {
        Kernel::set_bot_predicate(self, name, value)
    }

    fn bot_predicate(&self, name: &str) -> Option<String> {
        Kernel::bot_predicate(self, name).map(str::to_string)
    }
}
