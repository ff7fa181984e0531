// Google Natural Language sentiment provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::SentimentProvider;
use crate::classifier::SentimentScore;

const LANGUAGE_API_BASE: &str = "https://language.googleapis.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Confidence attached to scores coming from the external provider
const EXTERNAL_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Serialize)]
struct AnalyzeRequest {
    document: Document,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(rename = "type")]
    doc_type: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    document_sentiment: DocumentSentiment,
}

#[derive(Debug, Deserialize)]
struct DocumentSentiment {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    magnitude: f64,
}

/// Google Cloud Natural Language `analyzeSentiment` client
#[derive(Clone)]
pub struct GoogleSentimentProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleSentimentProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: LANGUAGE_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SentimentProvider for GoogleSentimentProvider {
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentScore> {
        let request = AnalyzeRequest {
            document: Document {
                doc_type: "PLAIN_TEXT",
                content: text.to_string(),
            },
        };

        let url = format!(
            "{}/v1/documents:analyzeSentiment?key={}",
            self.base_url, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to sentiment API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sentiment API request failed: {} {}", status, error_body);
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .context("Failed to parse sentiment API response")?;

        Ok(SentimentScore {
            score: body.document_sentiment.score,
            magnitude: body.document_sentiment.magnitude,
            confidence: EXTERNAL_CONFIDENCE,
        })
    }

    fn name(&self) -> &str {
        "google-natural-language"
    }
}
