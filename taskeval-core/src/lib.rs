//! # taskeval Core
//!
//! Core types, errors, and traits for the taskeval code evaluation service.
//!
//! This crate provides the foundational building blocks used by all other taskeval crates:
//!
//! - **Types**: Domain models for tasks, evaluation reports, and statistics
//! - **Errors**: Comprehensive error types with context
//! - **Constants**: Service defaults and limits
//! - **Traits**: Common interfaces for extensibility
//!
//! ## Example
//!
//! ```rust
//! use taskeval_core::Task;
//! use uuid::Uuid;
//!
//! // Types are serializable and well-documented
//! let task = Task::new(Uuid::new_v4(), "fizzbuzz", "rust", "fn main() {}");
//! let json = serde_json::to_string(&task).unwrap();
//! assert!(json.contains("fizzbuzz"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{EvalError, Result};
pub use traits::*;
pub use types::*;
