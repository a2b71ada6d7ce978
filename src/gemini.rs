use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::ContentBackend;
use crate::config::GeminiConfig;
use crate::error::BackendError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `ContentBackend` over the Gemini `generateContent` REST endpoint.
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GeminiBackend {
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let endpoint = format!("{}/models/{}:generateContent", base_url.trim_end_matches('/'), model);

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| BackendError::Unavailable("API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("palabra/", env!("CARGO_PKG_VERSION"))),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| BackendError::Http {
            url: endpoint.clone(),
            source: e,
        })?;

        Ok(Self {
            client,
            endpoint,
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        let timeout = config.request_timeout()?;
        let backend = Self::new(&api_key, &config.model, &config.base_url, timeout).context("building Gemini client")?;
        Ok(backend)
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, BackendError> {
        debug!(model = %self.model, url = %self.endpoint, "sending generateContent request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Http {
                url: self.endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| BackendError::Http {
            url: self.endpoint.clone(),
            source: e,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.chars().take(500).collect());
            warn!(status = status.as_u16(), message = %message, "Gemini request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| BackendError::Status {
            status: status.as_u16(),
            message: format!("unreadable generateContent response: {e}"),
        })?;

        response_text(parsed)
    }
}

/// Concatenated text of the first candidate, skipping thought parts.
fn response_text(response: GenerateResponse) -> Result<String, BackendError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let block_reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "none".to_string());
        return Err(BackendError::NoCandidates { block_reason });
    };

    if let Some(reason) = candidate.finish_reason.as_deref()
        && reason != "STOP"
    {
        warn!(finish_reason = %reason, "Gemini candidate did not finish normally");
    }

    let text = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    debug!(chars = text.len(), "received generateContent text");
    Ok(text)
}

#[async_trait]
impl ContentBackend for GeminiBackend {
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, BackendError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
            tools: Vec::new(),
        };
        self.generate(&request).await
    }

    async fn generate_grounded(&self, prompt: &str) -> Result<String, BackendError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: None,
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };
        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn joins_text_parts_and_skips_thoughts() {
        let response = decode(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(response_text(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn missing_candidates_reports_block_reason() {
        let response = decode(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        match response_text(response) {
            Err(BackendError::NoCandidates { block_reason }) => assert_eq!(block_reason, "SAFETY"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn candidate_without_content_yields_empty_text() {
        let response = decode(json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }));
        assert_eq!(response_text(response).unwrap(), "");
    }

    #[test]
    fn grounded_request_serializes_search_tool() {
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: None,
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["tools"], json!([{ "google_search": {} }]));
        assert!(value.get("generationConfig").is_none());
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn structured_request_serializes_schema() {
        let schema = json!({ "type": "OBJECT" });
        let request = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: "hi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &schema,
            }),
            tools: Vec::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"], schema);
        assert!(value.get("tools").is_none());
    }
}
