//! AI adapter: model client abstraction, the Gemini REST provider and a scripted mock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Opaque text-in/text-out model boundary.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
    /// Model name for diagnostics.
    fn model_name(&self) -> &str;
}

/// Convenient alias used by callers.
pub type DynModelClient = Arc<dyn ModelClient>;

// ------------------------------------------------------------
// Gemini provider
// ------------------------------------------------------------

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .user_agent("vigimanaus-ingest/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host (proxies, local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Models available to this key that support `generateContent`.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ModelError> {
        #[derive(Deserialize)]
        struct ListResp {
            #[serde(default)]
            models: Vec<ModelInfo>,
        }

        let resp = self
            .http
            .get(format!("{}/v1beta/models", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;
        let body: ListResp = check_status(resp).await?.json().await?;
        Ok(body
            .models
            .into_iter()
            .filter(|m| m.supports_generate_content())
            .collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Serialize)]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartReq<'a>>,
}
#[derive(Serialize)]
struct PartReq<'a> {
    text: &'a str,
}
#[derive(Deserialize)]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp {
    text: Option<String>,
}

fn response_text(resp: GenerateResp) -> Option<String> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ModelError::Status {
        status: status.as_u16(),
        body: body.chars().take(300).collect(),
    })
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let req = GenerateReq {
            contents: vec![Content {
                parts: vec![PartReq { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;
        let body: GenerateResp = check_status(resp).await?.json().await?;
        response_text(body).ok_or(ModelError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ------------------------------------------------------------
// Mock
// ------------------------------------------------------------

type Responder = dyn Fn(&str) -> Result<String, ModelError> + Send + Sync;

/// Closure-driven model for tests and dry runs. Counts calls.
pub struct MockModel {
    respond: Box<Responder>,
    calls: AtomicUsize,
}

impl MockModel {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(f),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always answers with the same text.
    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(prompt)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let resp: GenerateResp = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}},
                              {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(resp).as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn blocked_or_empty_response_has_no_text() {
        let resp: GenerateResp = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(response_text(resp).is_none());
        let resp: GenerateResp =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(response_text(resp).is_none());
    }

    #[test]
    fn model_list_filters_on_generate_content() {
        let m: ModelInfo = serde_json::from_str(
            r#"{"name":"models/gemini-2.5-flash-lite","supportedGenerationMethods":["generateContent","countTokens"]}"#,
        )
        .unwrap();
        assert!(m.supports_generate_content());
        let e: ModelInfo =
            serde_json::from_str(r#"{"name":"models/embedding-001","supportedGenerationMethods":["embedContent"]}"#)
                .unwrap();
        assert!(!e.supports_generate_content());
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let m = MockModel::fixed("{}");
        assert_eq!(m.generate("a").await.unwrap(), "{}");
        m.generate("b").await.unwrap();
        assert_eq!(m.calls(), 2);
    }
}
