//! Model response parsing.

use serde::Deserialize;

use taskeval_core::error::{EvalError, Result};
use taskeval_core::types::EvaluationReport;

/// Report as the model emits it: the score may arrive as a float or out
/// of range, so it is accepted loosely here and clamped on the way out.
#[derive(Deserialize)]
struct RawReport {
    score: f64,
    strengths: Vec<String>,
    improvements: Vec<String>,
    #[serde(rename = "fullReport")]
    full_report: String,
    #[serde(rename = "fixedCode")]
    fixed_code: String,
}

/// Extracts an [`EvaluationReport`] from raw model output.
///
/// Models wrap the requested JSON in prose more often than not, so the
/// slice between the first `{` and the last `}` is what gets parsed.
/// The score is clamped into 0..=100 and the report shape validated.
pub fn extract_report(content: &str) -> Result<EvaluationReport> {
    let start = content
        .find('{')
        .ok_or_else(|| EvalError::InvalidModelResponse("no JSON object in response".into()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| EvalError::InvalidModelResponse("unterminated JSON object".into()))?;
    if end < start {
        return Err(EvalError::InvalidModelResponse(
            "malformed JSON object".into(),
        ));
    }

    let raw: RawReport = serde_json::from_str(&content[start..=end])
        .map_err(|e| EvalError::InvalidModelResponse(format!("report shape mismatch: {e}")))?;

    let report = EvaluationReport {
        score: EvaluationReport::clamp_score(raw.score),
        strengths: raw.strengths,
        improvements: raw.improvements,
        full_report: raw.full_report,
        fixed_code: raw.fixed_code,
    };

    report.validate()?;
    Ok(report)
}
