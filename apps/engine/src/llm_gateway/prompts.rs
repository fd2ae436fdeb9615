//! Prompt templates and typed wrappers for the three oracle operations:
//! question generation, answer evaluation, and end-of-session reporting.
//! Every wrapper goes through `invoke` with a fully-shaped neutral fallback,
//! so callers render degraded results without special cases.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::llm_gateway::{LlmGateway, TextCompletion};
use crate::models::interview::{Difficulty, EvaluationResult, Question};

/// System prompt enforcing JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise technical interviewer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

pub const QUESTION_PROMPT_TEMPLATE: &str = "\
Generate one {difficulty} interview question on the topic '{topic}' \
in the domain '{domain}'. Respond with a JSON object with keys: \
text, difficulty (easy|medium|hard), topic, domain, time_limit_secs, \
is_coding, test_cases (array of strings or null).";

pub const THEORETICAL_EVAL_TEMPLATE: &str = "\
Evaluate this interview answer on a 0-10 scale.\n\
Question: {question}\nAnswer: {answer}\n\
Respond with a JSON object with keys: score, technical_accuracy, clarity, \
depth, strengths (array), weaknesses (array), improvements (array).";

pub const CODING_EVAL_TEMPLATE: &str = "\
Evaluate this coding submission.\n\
Question: {question}\nLanguage: {language}\nCode:\n{code}\n\
Respond with a JSON object with keys: logic_score, readability_score, \
edge_case_handling (qualitative text), time_complexity (Big-O), \
space_complexity (Big-O), improvement_suggestions (array).";

pub const REPORT_TEMPLATE: &str = "\
Write a final interview report for a session with overall average {average} \
across {count} answers. Topic scores: {topics}.\n\
Respond with a JSON object with keys: summary, strengths (array), \
areas_for_improvement (array), recommendation.";

const QUESTION_KEYS: &[&str] = &[
    "text",
    "difficulty",
    "topic",
    "domain",
    "time_limit_secs",
    "is_coding",
];
const THEORETICAL_KEYS: &[&str] = &[
    "score",
    "technical_accuracy",
    "clarity",
    "depth",
    "strengths",
    "weaknesses",
    "improvements",
];
const CODING_KEYS: &[&str] = &[
    "logic_score",
    "readability_score",
    "edge_case_handling",
    "time_complexity",
    "space_complexity",
    "improvement_suggestions",
];
const REPORT_KEYS: &[&str] = &["summary", "strengths", "areas_for_improvement", "recommendation"];

const DEGRADED_NOTE: &str = "Automated evaluation was unavailable; a neutral score was assigned.";

/// End-of-session narrative report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub summary: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendation: String,
}

/// Generates the next question. Falls back to a generic question on the
/// requested topic when the oracle is unavailable.
pub async fn generate_question<C: TextCompletion>(
    gateway: &LlmGateway<C>,
    topic: &str,
    difficulty: Difficulty,
    domain: &str,
) -> Question {
    let fallback = fallback_question(topic, difficulty, domain);
    let prompt = QUESTION_PROMPT_TEMPLATE
        .replace("{difficulty}", difficulty.as_str())
        .replace("{topic}", topic)
        .replace("{domain}", domain);

    let fallback_value = serde_json::to_value(&fallback).unwrap_or(Value::Null);
    let value = gateway
        .invoke(&prompt, JSON_ONLY_SYSTEM, QUESTION_KEYS, fallback_value)
        .await;
    serde_json::from_value(value).unwrap_or(fallback)
}

/// Evaluates a theoretical answer. Degrades to a neutral score-5 result.
pub async fn evaluate_theoretical<C: TextCompletion>(
    gateway: &LlmGateway<C>,
    question: &str,
    answer: &str,
) -> EvaluationResult {
    let fallback = neutral_theoretical();
    let prompt = THEORETICAL_EVAL_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer);

    let value = gateway
        .invoke(&prompt, JSON_ONLY_SYSTEM, THEORETICAL_KEYS, Value::Null)
        .await;
    tag_and_parse(value, "theoretical").unwrap_or(fallback)
}

/// Evaluates a coding submission. Degrades to neutral sub-scores.
pub async fn evaluate_coding<C: TextCompletion>(
    gateway: &LlmGateway<C>,
    question: &str,
    language: &str,
    code: &str,
) -> EvaluationResult {
    let fallback = neutral_coding();
    let prompt = CODING_EVAL_TEMPLATE
        .replace("{question}", question)
        .replace("{language}", language)
        .replace("{code}", code);

    let value = gateway
        .invoke(&prompt, JSON_ONLY_SYSTEM, CODING_KEYS, Value::Null)
        .await;
    tag_and_parse(value, "coding").unwrap_or(fallback)
}

/// Generates the final session report.
pub async fn generate_report<C: TextCompletion>(
    gateway: &LlmGateway<C>,
    average: f64,
    answer_count: usize,
    topic_scores: &Value,
) -> SessionReport {
    let fallback = SessionReport {
        summary: DEGRADED_NOTE.to_string(),
        strengths: vec![],
        areas_for_improvement: vec![],
        recommendation: "Review this session manually.".to_string(),
    };
    let prompt = REPORT_TEMPLATE
        .replace("{average}", &format!("{average:.1}"))
        .replace("{count}", &answer_count.to_string())
        .replace("{topics}", &topic_scores.to_string());

    let fallback_value = serde_json::to_value(&fallback).unwrap_or(Value::Null);
    let value = gateway
        .invoke(&prompt, JSON_ONLY_SYSTEM, REPORT_KEYS, fallback_value)
        .await;
    serde_json::from_value(value).unwrap_or(fallback)
}

/// The oracle emits untagged evaluation objects; inject the discriminant
/// before deserializing into the tagged union.
fn tag_and_parse(mut value: Value, kind: &str) -> Option<EvaluationResult> {
    let object = value.as_object_mut()?;
    object.insert("kind".to_string(), json!(kind));
    serde_json::from_value(value).ok()
}

fn fallback_question(topic: &str, difficulty: Difficulty, domain: &str) -> Question {
    Question {
        text: format!("Explain the key concepts of {topic} and where you have applied them."),
        difficulty,
        topic: topic.to_string(),
        domain: domain.to_string(),
        time_limit_secs: 300,
        is_coding: false,
        test_cases: None,
    }
}

fn neutral_theoretical() -> EvaluationResult {
    EvaluationResult::Theoretical {
        score: 5.0,
        technical_accuracy: 5.0,
        clarity: 5.0,
        depth: 5.0,
        strengths: vec![],
        weaknesses: vec![],
        improvements: vec![DEGRADED_NOTE.to_string()],
    }
}

fn neutral_coding() -> EvaluationResult {
    EvaluationResult::Coding {
        logic_score: 5.0,
        readability_score: 5.0,
        edge_case_handling: "not assessed".to_string(),
        time_complexity: "unknown".to_string(),
        space_complexity: "unknown".to_string(),
        improvement_suggestions: vec![DEGRADED_NOTE.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayError;
    use crate::llm_gateway::retry::RetryPolicy;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedOracle(Mutex<Option<Result<String, GatewayError>>>);

    #[async_trait]
    impl TextCompletion for FixedOracle {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, GatewayError> {
            self.0
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GatewayError::EmptyContent))
        }
    }

    fn gateway(response: Result<String, GatewayError>) -> LlmGateway<FixedOracle> {
        LlmGateway::new(FixedOracle(Mutex::new(Some(response))), Duration::ZERO)
            .with_policy(RetryPolicy::new(vec![]))
    }

    #[tokio::test]
    async fn test_evaluate_theoretical_parses_untagged_object() {
        let body = r#"{
            "score": 8.5, "technical_accuracy": 9, "clarity": 8, "depth": 8,
            "strengths": ["clear"], "weaknesses": [], "improvements": []
        }"#;
        let gw = gateway(Ok(body.to_string()));
        let eval = evaluate_theoretical(&gw, "q", "a").await;
        assert!((eval.overall_score() - 8.5).abs() < f64::EPSILON);
        assert!(!eval.is_coding());
    }

    #[tokio::test]
    async fn test_evaluate_theoretical_degrades_to_neutral() {
        let gw = gateway(Err(GatewayError::EmptyContent));
        let eval = evaluate_theoretical(&gw, "q", "a").await;
        assert!((eval.overall_score() - 5.0).abs() < f64::EPSILON);
        match eval {
            EvaluationResult::Theoretical { improvements, .. } => {
                assert_eq!(improvements, vec![DEGRADED_NOTE.to_string()]);
            }
            _ => panic!("expected theoretical fallback"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_coding_parses_untagged_object() {
        let body = r#"{
            "logic_score": 9, "readability_score": 8,
            "edge_case_handling": "good coverage",
            "time_complexity": "O(n)", "space_complexity": "O(1)",
            "improvement_suggestions": ["add docs"]
        }"#;
        let gw = gateway(Ok(body.to_string()));
        let eval = evaluate_coding(&gw, "q", "rust", "fn main() {}").await;
        assert!(eval.is_coding());
    }

    #[tokio::test]
    async fn test_generate_question_degrades_to_topic_fallback() {
        let gw = gateway(Err(GatewayError::EmptyContent));
        let question = generate_question(&gw, "ownership", Difficulty::Hard, "rust").await;
        assert_eq!(question.topic, "ownership");
        assert_eq!(question.difficulty, Difficulty::Hard);
        assert!(question.text.contains("ownership"));
    }

    #[tokio::test]
    async fn test_generate_report_degrades_with_note() {
        let gw = gateway(Ok("garbage".to_string()));
        let report = generate_report(&gw, 6.4, 5, &serde_json::json!({})).await;
        assert_eq!(report.summary, DEGRADED_NOTE);
    }
}
