//! Aggregate statistics over the store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Evaluation, Task};

/// Counters maintained by a task store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of tasks
    pub total_tasks: u64,
    /// Total number of evaluations
    pub total_evaluations: u64,
    /// Evaluations whose full report has been unlocked
    pub paid_reports: u64,
    /// Tasks per normalized language
    pub language_distribution: HashMap<String, u64>,
}

impl StoreStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates stats with a new task.
    pub fn add_task(&mut self, task: &Task) {
        self.total_tasks += 1;
        *self
            .language_distribution
            .entry(task.normalized_language())
            .or_insert(0) += 1;
    }

    /// Updates stats with a new evaluation.
    pub fn add_evaluation(&mut self, evaluation: &Evaluation) {
        self.total_evaluations += 1;
        if evaluation.is_paid {
            self.paid_reports += 1;
        }
    }

    /// Records that an evaluation was unlocked.
    pub fn add_paid(&mut self) {
        self.paid_reports += 1;
    }
}

/// Mean score over a set of evaluations, rounded to two decimals.
///
/// Returns 0.0 for an empty slice.
pub fn average_score(evaluations: &[Evaluation]) -> f64 {
    if evaluations.is_empty() {
        return 0.0;
    }

    let sum: u64 = evaluations.iter().map(|e| e.score as u64).sum();
    let mean = sum as f64 / evaluations.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvaluationReport;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn make_eval(score: u8) -> Evaluation {
        let task = Task::new(Uuid::new_v4(), "t", "rust", "fn main() {}");
        Evaluation::from_report(
            &task,
            EvaluationReport {
                score,
                strengths: vec![],
                improvements: vec![],
                full_report: "report".into(),
                fixed_code: "code".into(),
            },
        )
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = StoreStats::new();

        stats.add_task(&Task::new(Uuid::new_v4(), "a", "Rust", "x"));
        stats.add_task(&Task::new(Uuid::new_v4(), "b", "rust", "y"));
        stats.add_task(&Task::new(Uuid::new_v4(), "c", "python", "z"));

        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.language_distribution["rust"], 2);
        assert_eq!(stats.language_distribution["python"], 1);
    }

    #[test]
    fn test_average_score_empty() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_average_score_rounds_to_two_decimals() {
        let evals = vec![make_eval(70), make_eval(80), make_eval(85)];
        // (70 + 80 + 85) / 3 = 78.333...
        assert_eq!(average_score(&evals), 78.33);
    }

    #[test]
    fn test_average_score_single() {
        assert_eq!(average_score(&[make_eval(42)]), 42.0);
    }

    proptest! {
        #[test]
        fn prop_average_score_stays_in_bounds(scores in prop::collection::vec(0u8..=100, 0..50)) {
            let evals: Vec<Evaluation> = scores.iter().map(|&s| make_eval(s)).collect();
            let avg = average_score(&evals);
            prop_assert!((0.0..=100.0).contains(&avg));
        }
    }
}
