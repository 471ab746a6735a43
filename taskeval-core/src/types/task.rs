//! Task types for the taskeval store.
//!
//! A task is a user-uploaded code snippet together with the metadata the
//! evaluator needs: the language it is written in and an optional free-form
//! description of what the code is supposed to do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MAX_CODE_BYTES, MAX_LANGUAGE_CHARS, MAX_TITLE_CHARS};
use crate::error::{EvalError, Result};

/// An uploaded code snippet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (assigned at creation)
    pub id: Uuid,
    /// Owner of the task
    pub user_id: Uuid,
    /// Short human-readable title
    pub title: String,
    /// Programming language of the snippet (free-form, matched case-insensitively)
    pub language: String,
    /// The snippet itself
    pub code: String,
    /// Optional context for the evaluator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with a fresh identifier.
    pub fn new(
        user_id: Uuid,
        title: impl Into<String>,
        language: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            language: language.into(),
            code: code.into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    /// Attaches a description to the task.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the task structure.
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(EvalError::ValidationError("code cannot be empty".into()));
        }
        if self.code.len() > MAX_CODE_BYTES {
            return Err(EvalError::ValidationError(format!(
                "code exceeds {} bytes: got {}",
                MAX_CODE_BYTES,
                self.code.len()
            )));
        }

        if self.language.trim().is_empty() {
            return Err(EvalError::ValidationError("language cannot be empty".into()));
        }
        if self.language.chars().count() > MAX_LANGUAGE_CHARS {
            return Err(EvalError::ValidationError(format!(
                "language exceeds {} characters",
                MAX_LANGUAGE_CHARS
            )));
        }

        if self.title.trim().is_empty() {
            return Err(EvalError::ValidationError("title cannot be empty".into()));
        }
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(EvalError::ValidationError(format!(
                "title exceeds {} characters",
                MAX_TITLE_CHARS
            )));
        }

        Ok(())
    }

    /// Returns the language normalized for comparison (lowercase, trimmed).
    pub fn normalized_language(&self) -> String {
        self.language.trim().to_lowercase()
    }
}

/// Parses a task identifier supplied by an external caller.
///
/// Callers send ids as strings; anything that is not a UUID is rejected
/// before it reaches the store.
pub fn parse_task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| EvalError::InvalidTaskId(raw.into()))
}
