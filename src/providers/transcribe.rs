// Google Speech-to-Text transcription provider

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::TranscriptionProvider;

const SPEECH_API_BASE: &str = "https://speech.googleapis.com";
const DEFAULT_LANGUAGE: &str = "en-IN";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest {
    config: RecognizeConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeConfig {
    language_code: String,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Google Speech-to-Text `speech:recognize` client
#[derive(Clone)]
pub struct GoogleSpeechProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleSpeechProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: SPEECH_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TranscriptionProvider for GoogleSpeechProvider {
    async fn transcribe(&self, audio_base64: &str, language_code: Option<&str>) -> Result<String> {
        let request = RecognizeRequest {
            config: RecognizeConfig {
                language_code: language_code.unwrap_or(DEFAULT_LANGUAGE).to_string(),
            },
            audio: RecognitionAudio {
                content: audio_base64.to_string(),
            },
        };

        let url = format!("{}/v1/speech:recognize?key={}", self.base_url, self.api_key);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to speech API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Speech API request failed: {} {}", status, error_body);
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .context("Failed to parse speech API response")?;

        let transcript = body
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if transcript.is_empty() {
            anyhow::bail!("Speech API returned no transcription results");
        }

        Ok(transcript)
    }

    fn name(&self) -> &str {
        "google-speech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transcribe_joins_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/speech:recognize")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"results":[
                    {"alternatives":[{"transcript":"today was"}]},
                    {"alternatives":[{"transcript":"a hard day"}]}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = GoogleSpeechProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url(server.url());

        let text = provider.transcribe("c29tZSBhdWRpbw==", None).await.unwrap();
        assert_eq!(text, "today was a hard day");
    }

    #[tokio::test]
    async fn test_empty_results_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/speech:recognize")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results":[]}"#)
            .create_async()
            .await;

        let provider = GoogleSpeechProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url(server.url());

        assert!(provider.transcribe("c29tZQ==", None).await.is_err());
    }
}
