//! Terminal presentation: dialog prompts and listing output

pub mod prompt;
pub mod table;

pub use prompt::{Outcome, PromptRenderer};
