//! LLM evaluation client for taskeval.
//!
//! [`LlmEvaluator`] talks to an OpenAI-compatible chat-completions API and
//! turns a task into a structured [`taskeval_core::EvaluationReport`].
//! [`OfflineEvaluator`] is a deterministic local implementation for
//! development and tests.

mod client;
mod offline;
mod parse;
mod prompt;

pub use client::{LlmConfig, LlmEvaluator};
pub use offline::OfflineEvaluator;
pub use parse::extract_report;
pub use prompt::build_prompt;
