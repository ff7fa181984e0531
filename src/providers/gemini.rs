// Gemini generative-language provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::LanguageProvider;
use crate::chat::{ChatMessage, Sender};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT_SECS: u64 = 30;

const SYSTEM_PROMPT: &str = "You are a warm, supportive mental-wellness companion. Listen \
    carefully, validate feelings, and respond with empathy in a few short paragraphs. Never \
    diagnose or give medical advice. When someone is struggling, gently encourage them to \
    reach out to a counselor or a trusted person in their life.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: ContentPart,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct ContentPart {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Gemini API provider
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Override the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn to_contents(history: &[ChatMessage]) -> Vec<Content> {
        history
            .iter()
            .map(|message| Content {
                role: match message.sender {
                    Sender::User => "user".to_string(),
                    Sender::Assistant => "model".to_string(),
                },
                parts: vec![Part {
                    text: message.text.clone(),
                }],
            })
            .collect()
    }
}

#[async_trait]
impl LanguageProvider for GeminiProvider {
    async fn generate_reply(&self, history: &[ChatMessage]) -> Result<String> {
        let request = GenerateRequest {
            system_instruction: ContentPart {
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: Self::to_contents(history),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        tracing::debug!(model = %self.model, turns = history.len(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API request failed: {} {}", status, error_body);
        }

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text = body
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|text| !text.is_empty())
            .context("Gemini API returned no candidates")?;

        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
