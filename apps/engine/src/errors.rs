use thiserror::Error;

/// Failure classes for the LLM gateway. Everything except `Api` with a 4xx
/// status (other than 429) is retryable; after retries are exhausted the
/// gateway degrades to the caller-supplied fallback instead of surfacing
/// these. Analytics code never constructs errors — data absence yields
/// neutral reports.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no structured value found in oracle output")]
    Extraction,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("parsed value missing required keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("oracle returned empty content")]
    EmptyContent,
}

impl GatewayError {
    /// Retryability predicate shared by every gateway call site.
    /// Network errors and timeouts, 5xx, 429, and any parse or schema
    /// failure are transient; other 4xx fail fast.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Http(_) => true,
            GatewayError::Api { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Extraction
            | GatewayError::Parse(_)
            | GatewayError::MissingKeys(_)
            | GatewayError::EmptyContent => true,
        }
    }

    /// Short class label for structured logging.
    pub fn class(&self) -> &'static str {
        match self {
            GatewayError::Http(_) => "network",
            GatewayError::Api { status, .. } if *status == 429 => "rate_limited",
            GatewayError::Api { status, .. } if *status >= 500 => "server_error",
            GatewayError::Api { .. } => "client_error",
            GatewayError::Extraction | GatewayError::Parse(_) => "parse_failure",
            GatewayError::MissingKeys(_) => "schema_violation",
            GatewayError::EmptyContent => "empty_content",
        }
    }
}
