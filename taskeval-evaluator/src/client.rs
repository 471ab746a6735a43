//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use taskeval_core::constants::{
    DEFAULT_COMPLETIONS_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
use taskeval_core::error::{EvalError, Result};
use taskeval_core::traits::Evaluator;
use taskeval_core::types::{EvaluationReport, Task};

use crate::parse::extract_report;
use crate::prompt::build_prompt;

/// Model client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL
    pub api_url: String,
    /// Bearer token for the API
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Completion token budget
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_COMPLETIONS_URL.into(),
            api_key: String::new(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
        }
    }
}

impl LlmConfig {
    /// Builds a config from the environment.
    ///
    /// Reads `TASKEVAL_API_KEY` (required for live calls), and optionally
    /// `TASKEVAL_API_URL` and `TASKEVAL_MODEL`.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("TASKEVAL_API_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETIONS_URL.into()),
            api_key: std::env::var("TASKEVAL_API_KEY").unwrap_or_default(),
            model: std::env::var("TASKEVAL_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Evaluator backed by a hosted LLM API.
pub struct LlmEvaluator {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl LlmEvaluator {
    /// Creates an evaluator from the environment.
    pub fn from_env() -> Result<Self> {
        Self::with_config(LlmConfig::from_env())
    }

    /// Creates an evaluator with custom configuration.
    pub fn with_config(config: LlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(EvalError::ConfigError(
                "TASKEVAL_API_KEY is not set".into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EvalError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    #[instrument(skip(self, task), fields(task_id = %task.id, language = %task.language))]
    async fn evaluate(&self, task: &Task) -> Result<EvaluationReport> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(task),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EvalError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Model API error");

            if status.as_u16() == 429 {
                return Err(EvalError::RateLimited(body));
            }
            return Err(EvalError::EvaluatorUnavailable(format!(
                "model API returned {status}: {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EvalError::InvalidModelResponse(format!("bad response body: {e}")))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| EvalError::InvalidModelResponse("response has no choices".into()))?;

        let report = extract_report(content)?;
        debug!(score = report.score, "Parsed evaluation report");

        Ok(report)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_task() -> Task {
        Task::new(Uuid::new_v4(), "t", "rust", "fn main() {}")
    }

    fn make_evaluator(server: &MockServer) -> LlmEvaluator {
        LlmEvaluator::with_config(LlmConfig {
            api_url: format!("{}/v1/chat/completions", server.uri()),
            api_key: "test-key".into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = LlmEvaluator::with_config(LlmConfig::default());
        assert!(matches!(result, Err(EvalError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_evaluate_parses_report() {
        let server = MockServer::start().await;
        let content = r#"{"score": 72, "strengths": ["works"], "improvements": ["tests"],
            "fullReport": "Decent.", "fixedCode": "fn main() {}"}"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(content)))
            .mount(&server)
            .await;

        let report = make_evaluator(&server)
            .evaluate(&make_task())
            .await
            .unwrap();
        assert_eq!(report.score, 72);
        assert_eq!(report.improvements, vec!["tests"]);
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_retryable_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = make_evaluator(&server)
            .evaluate(&make_task())
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::RateLimited(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = make_evaluator(&server)
            .evaluate(&make_task())
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::EvaluatorUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = make_evaluator(&server)
            .evaluate(&make_task())
            .await
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidModelResponse(_)));
    }
}
