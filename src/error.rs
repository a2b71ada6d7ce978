use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("no Gemini API key: set gemini.api_key or the {0} environment variable")]
    MissingApiKey(String),
}

#[derive(Debug, Error)]
#[error("unsupported language code '{0}'")]
pub struct UnsupportedLanguage(pub String);

/// The outbound call itself failed.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend returned no candidates (block reason: {block_reason})")]
    NoCandidates { block_reason: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A response arrived but did not have the expected shape.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response payload is empty")]
    MissingPayload,
    #[error("no JSON object found in response text")]
    NoJsonBlock,
    #[error("response does not match the expected shape: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response failed validation: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A completion arrived for a selection that is no longer current.
#[derive(Debug, Error)]
#[error("stale result for generation {issued} (current is {current})")]
pub(crate) struct StaleResult {
    pub issued: u64,
    pub current: u64,
}
