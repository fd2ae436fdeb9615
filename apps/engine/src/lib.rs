//! Adaptive evaluation and analytics core for the mock-interview platform.
//!
//! The LLM gateway is the sole I/O boundary; everything else is pure,
//! synchronous computation over already-materialized session history. HTTP
//! routing, persistence, auth, and resume-text extraction live with the
//! platform layer and consume this crate as a library.

pub mod adaptive;
pub mod analytics;
pub mod coding;
pub mod config;
pub mod errors;
pub mod llm_gateway;
pub mod models;

pub use config::EngineConfig;
pub use errors::GatewayError;
pub use llm_gateway::{AnthropicClient, LlmGateway, TextCompletion};
pub use models::interview::{
    Answer, CompletedSession, Difficulty, EvaluationResult, InteractionTelemetry, Question,
    SessionState, SkillPerformanceEntry,
};
pub use models::resume::ResumeProfile;
