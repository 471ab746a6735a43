//! Deterministic offline evaluator.
//!
//! Produces a heuristic report without any network access. Used by the
//! CLI when no API key is configured, and by tests that need a real
//! `Evaluator` with predictable output.

use async_trait::async_trait;
use tracing::debug;

use taskeval_core::constants::MAX_SCORE;
use taskeval_core::error::Result;
use taskeval_core::traits::Evaluator;
use taskeval_core::types::{EvaluationReport, Task};

/// Evaluator that scores snippets with local heuristics.
#[derive(Clone, Debug, Default)]
pub struct OfflineEvaluator;

impl OfflineEvaluator {
    /// Creates a new offline evaluator.
    pub fn new() -> Self {
        Self
    }

    fn score(task: &Task) -> u8 {
        let code = task.code.as_str();
        let lines = code.lines().count();

        let mut score: i64 = 70;

        // Reward short, commented snippets; penalize leftover markers
        if lines <= 50 {
            score += 10;
        }
        if code.contains("//") || code.contains('#') {
            score += 5;
        }
        score -= 5 * code.matches("TODO").count().min(4) as i64;
        score -= 10 * code.matches("unwrap()").count().min(2) as i64;

        score.clamp(0, MAX_SCORE as i64) as u8
    }
}

#[async_trait]
impl Evaluator for OfflineEvaluator {
    async fn evaluate(&self, task: &Task) -> Result<EvaluationReport> {
        let score = Self::score(task);
        let lines = task.code.lines().count();

        let mut strengths = vec![format!("Compact {} snippet ({} lines)", task.language, lines)];
        if task.description.is_some() {
            strengths.push("Comes with a description of intent".into());
        }

        let mut improvements = Vec::new();
        if task.code.contains("TODO") {
            improvements.push("Resolve the remaining TODO markers".into());
        }
        if !task.code.contains("test") {
            improvements.push("Add tests covering the main code paths".into());
        }

        let report = EvaluationReport {
            score,
            strengths,
            improvements,
            full_report: format!(
                "Offline heuristic review of {} lines of {}: score {}/100. \
                 This report was produced without a model; request a hosted \
                 evaluation for a full analysis.",
                lines, task.language, score
            ),
            fixed_code: task.code.clone(),
        };

        debug!(score, "Produced offline report");
        report.validate()?;
        Ok(report)
    }

    fn name(&self) -> &str {
        "offline"
    }
}
