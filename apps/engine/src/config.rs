use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables.
/// Only the API key is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub anthropic_api_key: String,
    /// Fixed pre-call pacing delay applied before every oracle call, in ms.
    pub pacing_delay_ms: u64,
    /// Hard wall-clock timeout per oracle request, in seconds.
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(EngineConfig {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            pacing_delay_ms: env_or("LLM_PACING_DELAY_MS", 1000)?,
            request_timeout_secs: env_or("LLM_REQUEST_TIMEOUT_SECS", 120)?,
            max_tokens: env_or("LLM_MAX_TOKENS", 4096)?,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: String::new(),
            pacing_delay_ms: 1000,
            request_timeout_secs: 120,
            max_tokens: 4096,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
