//! Analysis backend seam and the Gemini implementation
//!
//! The primary classifier delegates free-text understanding to an external
//! reasoning backend. The `AnalysisBackend` trait decouples the engine from
//! the concrete service so the engine is testable with mock responses.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};

/// A string wrapper that redacts its value in Debug and Display output.
/// Prevents API keys from leaking into logs and error messages.
#[derive(Clone, Default)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Access the secret value (use sparingly, only for HTTP headers)
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Pluggable reasoning backend interface.
///
/// Implementations submit a prompt to an external service and return its
/// text response. Any failure surfaces as `Error::Backend` (or a transport
/// error) and is resolved by the engine's fallback chain, never by the
/// caller.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Submit a prompt and return the backend's text response.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend identifier for the audit log header and health endpoint.
    fn identifier(&self) -> &str;
}

/// Build the classification prompt for a captured text fragment.
///
/// Enumerates the sensitive-data categories of interest and asks for
/// either a structured "none found" response or an itemized list.
pub fn classification_prompt(text: &str, context_label: &str) -> String {
    format!(
        r#"Analyze the following text for any sensitive information like:
- Passwords or credentials
- Email addresses
- Phone numbers
- Credit card numbers
- Personal identification numbers
- API keys or tokens
- Private URLs or internal links
- Database connection strings

Text to analyze:
Window: {context_label}
Content: {text}

Provide a clear, structured response. If sensitive information is found, list each type with examples.
If no sensitive information is found, respond with "No sensitive information detected".
Be specific and concise in your analysis."#
    )
}

// ============================================================================
// Gemini backend
// ============================================================================

/// Prompt used by the startup connectivity self-test.
const PROBE_PROMPT: &str = "Hello, can you respond with 'API working'?";

/// Google Generative Language API client (`generateContent`).
pub struct GeminiBackend {
    api_key: SecretString,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<SecretString>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the HTTP client, typically to set a bounded request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Connectivity self-test, run once at startup.
    pub async fn probe(&self) -> Result<String> {
        self.generate(PROBE_PROMPT).await
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl AnalysisBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(self.request_url())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Backend(format!(
                "Gemini API error ({}): {}",
                status, text
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| Error::Backend(format!("Unparseable Gemini response: {}", e)))?;
        let answer = parsed.text();
        if answer.trim().is_empty() {
            return Err(Error::Backend("Empty Gemini response".to_string()));
        }
        Ok(answer)
    }

    fn identifier(&self) -> &str {
        &self.model
    }
}

/// `generateContent` response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}
