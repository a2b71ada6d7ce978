use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

/// The two generation capabilities the content client depends on.
#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Generation constrained to `schema`. Returns the raw JSON text of the answer.
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, BackendError>;

    /// Generation grounded by live web search. Returns the raw answer text.
    async fn generate_grounded(&self, prompt: &str) -> Result<String, BackendError>;
}
