//! LLM Gateway — the single point of entry for all oracle calls in the
//! engine. No other module may talk to the completion API directly.
//!
//! `invoke` never raises for expected failure classes: it always returns
//! either a structured value containing every required key, or the
//! caller-supplied fallback after bounded retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::GatewayError;

pub mod extract;
pub mod prompts;
pub mod retry;

use retry::RetryPolicy;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all oracle calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";

/// The opaque text-completion oracle: prompt in, raw text out, or failure.
/// Production uses [`AnthropicClient`]; tests script responses through a stub.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl CompletionResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

/// Anthropic Messages API client. One outbound request per `complete` call;
/// retries live in the gateway, not here.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &EngineConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.anthropic_api_key.clone(),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl TextCompletion for AnthropicClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, GatewayError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: self.max_tokens,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        // Timeouts surface as reqwest errors, i.e. network-class failures.
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        debug!(
            input_tokens = completion.usage.input_tokens,
            output_tokens = completion.usage.output_tokens,
            "oracle call succeeded"
        );

        completion
            .text()
            .map(str::to_string)
            .ok_or(GatewayError::EmptyContent)
    }
}

/// Fault-tolerant driver over a [`TextCompletion`] oracle.
///
/// Exactly one outstanding call per invocation; a fixed pacing delay before
/// the first attempt keeps call sites under the external rate limit. Bounding
/// total concurrency across sessions is the calling layer's job.
pub struct LlmGateway<C: TextCompletion> {
    oracle: C,
    policy: RetryPolicy,
    pacing_delay: Duration,
}

impl<C: TextCompletion> LlmGateway<C> {
    pub fn new(oracle: C, pacing_delay: Duration) -> Self {
        Self {
            oracle,
            policy: RetryPolicy::default(),
            pacing_delay,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Calls the oracle and extracts a structured value containing every key
    /// in `required_keys`. Transient failures (network/timeout, 5xx, 429,
    /// parse or schema failures) are retried on the policy's schedule; other
    /// 4xx fail fast. On exhaustion the fallback is returned unchanged —
    /// this method never errors.
    pub async fn invoke(
        &self,
        prompt: &str,
        system: &str,
        required_keys: &[&str],
        fallback: Value,
    ) -> Value {
        tokio::time::sleep(self.pacing_delay).await;

        let mut last_error: Option<GatewayError> = None;

        for attempt in 0..self.policy.max_attempts() {
            if attempt > 0 {
                // attempt > 0 implies a delay exists in the schedule
                if let Some(delay) = self.policy.delay_before_retry(attempt - 1) {
                    tokio::time::sleep(delay).await;
                }
            }

            match self.attempt(prompt, system, required_keys).await {
                Ok(value) => return value,
                Err(e) => {
                    debug!(attempt, class = e.class(), error = %e, "oracle attempt failed");
                    if !e.is_retryable() {
                        warn!(class = e.class(), "permanent oracle failure, degrading to fallback");
                        return fallback;
                    }
                    last_error = Some(e);
                }
            }
        }

        let class = last_error.as_ref().map(|e| e.class()).unwrap_or("unknown");
        warn!(class, "oracle retries exhausted, degrading to fallback");
        fallback
    }

    async fn attempt(
        &self,
        prompt: &str,
        system: &str,
        required_keys: &[&str],
    ) -> Result<Value, GatewayError> {
        let text = self.oracle.complete(prompt, system).await?;
        let value = extract::parse_structured(&text).ok_or(GatewayError::Extraction)?;
        validate_keys(&value, required_keys)?;
        Ok(value)
    }
}

/// Objects must carry every required key; arrays are exempt (batch payloads
/// are validated element-wise by their consumers).
fn validate_keys(value: &Value, required_keys: &[&str]) -> Result<(), GatewayError> {
    let Some(object) = value.as_object() else {
        return Ok(());
    };
    let missing: Vec<String> = required_keys
        .iter()
        .filter(|k| !object.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::MissingKeys(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted oracle: pops one canned result per call.
    struct ScriptedOracle {
        responses: Mutex<Vec<Result<String, GatewayError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedOracle {
        fn new(mut responses: Vec<Result<String, GatewayError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TextCompletion for ScriptedOracle {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(GatewayError::EmptyContent))
        }
    }

    fn gateway(responses: Vec<Result<String, GatewayError>>) -> LlmGateway<ScriptedOracle> {
        // Zero delays so tests run instantly.
        LlmGateway::new(ScriptedOracle::new(responses), Duration::ZERO)
            .with_policy(RetryPolicy::new(vec![Duration::ZERO, Duration::ZERO]))
    }

    #[tokio::test]
    async fn test_invoke_returns_clean_payload() {
        let gw = gateway(vec![Ok(r#"{"score": 8, "clarity": 7}"#.to_string())]);
        let value = gw
            .invoke("p", "s", &["score", "clarity"], json!({}))
            .await;
        assert_eq!(value["score"], 8);
    }

    #[tokio::test]
    async fn test_invoke_extracts_from_prose_and_fences() {
        let wrapped = "Here you go:\n```json\n{\"score\": 6}\n```\nCheers.";
        let gw = gateway(vec![Ok(wrapped.to_string())]);
        let value = gw.invoke("p", "s", &["score"], json!({})).await;
        assert_eq!(value["score"], 6);
    }

    #[tokio::test]
    async fn test_invoke_garbage_returns_fallback_unchanged() {
        let fallback = json!({"score": 5, "note": "evaluation unavailable"});
        let gw = gateway(vec![
            Ok("no json at all".to_string()),
            Ok("still nothing".to_string()),
            Ok("nope".to_string()),
        ]);
        let value = gw.invoke("p", "s", &["score"], fallback.clone()).await;
        assert_eq!(value, fallback);
    }

    #[tokio::test]
    async fn test_invoke_retries_transient_then_succeeds() {
        let gw = gateway(vec![
            Err(GatewayError::Api {
                status: 503,
                message: "overloaded".to_string(),
            }),
            Ok(r#"{"score": 9}"#.to_string()),
        ]);
        let value = gw.invoke("p", "s", &["score"], json!({})).await;
        assert_eq!(value["score"], 9);
        assert_eq!(gw.oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invoke_fails_fast_on_client_error() {
        let gw = gateway(vec![Err(GatewayError::Api {
            status: 401,
            message: "bad key".to_string(),
        })]);
        let fallback = json!({"score": 5});
        let value = gw.invoke("p", "s", &["score"], fallback.clone()).await;
        assert_eq!(value, fallback);
        assert_eq!(gw.oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_missing_keys_retries_as_schema_violation() {
        let gw = gateway(vec![
            Ok(r#"{"wrong": 1}"#.to_string()),
            Ok(r#"{"score": 7}"#.to_string()),
        ]);
        let value = gw.invoke("p", "s", &["score"], json!({})).await;
        assert_eq!(value["score"], 7);
        assert_eq!(gw.oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invoke_exhaustion_count() {
        let gw = gateway(vec![
            Err(GatewayError::EmptyContent),
            Err(GatewayError::EmptyContent),
            Err(GatewayError::EmptyContent),
        ]);
        let value = gw.invoke("p", "s", &[], json!(null)).await;
        assert_eq!(value, json!(null));
        // 1 initial + 2 retries
        assert_eq!(gw.oracle.call_count(), 3);
    }

    #[tokio::test]
    async fn test_arrays_skip_key_validation() {
        let gw = gateway(vec![Ok(r#"[{"q": "one"}, {"q": "two"}]"#.to_string())]);
        let value = gw.invoke("p", "s", &["q"], json!([])).await;
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_validate_keys_reports_all_missing() {
        let err = validate_keys(&json!({"a": 1}), &["a", "b", "c"]).unwrap_err();
        match err {
            GatewayError::MissingKeys(keys) => assert_eq!(keys, vec!["b", "c"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
