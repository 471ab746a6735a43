//! Evaluation types.
//!
//! [`EvaluationReport`] is the shape the model is asked to produce;
//! [`Evaluation`] is the stored row attached to a task, including the
//! paid flag that gates the full report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_SCORE;
use crate::error::{EvalError, Result};
use crate::types::Task;

/// The model's verdict on a snippet.
///
/// This mirrors the JSON object the evaluation prompt requests:
/// a 0-100 score, bullet lists of strengths and improvements, a full
/// narrative report, and a rewritten version of the code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Overall quality score, clamped into 0..=100
    pub score: u8,
    /// What the code does well
    pub strengths: Vec<String>,
    /// Concrete improvement suggestions
    pub improvements: Vec<String>,
    /// Detailed analysis covering bugs, refactoring, and performance
    #[serde(rename = "fullReport")]
    pub full_report: String,
    /// Complete rewritten code with the improvements applied
    #[serde(rename = "fixedCode")]
    pub fixed_code: String,
}

impl EvaluationReport {
    /// Validates the report shape and bounds.
    pub fn validate(&self) -> Result<()> {
        if self.score > MAX_SCORE {
            return Err(EvalError::InvalidModelResponse(format!(
                "score {} out of range 0..={}",
                self.score, MAX_SCORE
            )));
        }
        if self.full_report.trim().is_empty() {
            return Err(EvalError::InvalidModelResponse(
                "full report is empty".into(),
            ));
        }
        Ok(())
    }

    /// Clamps a raw model score into the valid range.
    pub fn clamp_score(raw: f64) -> u8 {
        raw.round().clamp(0.0, MAX_SCORE as f64) as u8
    }
}

/// A stored evaluation attached to a task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Evaluation {
    /// Unique identifier
    pub id: Uuid,
    /// The evaluated task
    pub task_id: Uuid,
    /// Owner of the task at evaluation time
    pub user_id: Uuid,
    /// Overall quality score
    pub score: u8,
    /// What the code does well
    pub strengths: Vec<String>,
    /// Concrete improvement suggestions
    pub improvements: Vec<String>,
    /// Detailed analysis (gated behind the paid flag)
    pub full_report: String,
    /// Rewritten code (gated behind the paid flag)
    pub fixed_code: String,
    /// Whether the full report has been unlocked
    pub is_paid: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Evaluation {
    /// Creates an evaluation row from a model report.
    pub fn from_report(task: &Task, report: EvaluationReport) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: task.id,
            user_id: task.user_id,
            score: report.score.min(MAX_SCORE),
            strengths: report.strengths,
            improvements: report.improvements,
            full_report: report.full_report,
            fixed_code: report.fixed_code,
            is_paid: false,
            created_at: Utc::now(),
        }
    }

    /// Returns the free preview of this evaluation.
    ///
    /// The score, strengths, and improvements are always visible; the
    /// narrative report and rewritten code are withheld until unlocked.
    pub fn redacted(&self) -> Self {
        Self {
            full_report: String::new(),
            fixed_code: String::new(),
            ..self.clone()
        }
    }
}
