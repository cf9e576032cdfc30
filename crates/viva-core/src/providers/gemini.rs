//! Gemini client (generateContent API)

use super::{ProviderClient, ProviderError, SAMPLING_TEMPERATURE};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Secondary provider: Gemini generateContent, key passed as a query
/// parameter rather than a header
pub struct GeminiClient {
    http_client: reqwest::Client,
    settings: ProviderSettings,
}

impl GeminiClient {
    const NAME: &'static str = "gemini";

    /// Create a new client from provider settings
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transport {
                provider: Self::NAME,
                source: e,
            })?;

        Ok(Self {
            http_client,
            settings,
        })
    }
}

#[async_trait]
impl ProviderClient for GeminiClient {
    async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
            #[serde(rename = "generationConfig")]
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            max_output_tokens: u32,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            #[serde(default)]
            content: CandidateContent,
        }

        #[derive(Deserialize, Default)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<ResponsePart>,
        }

        #[derive(Deserialize, Default)]
        struct ResponsePart {
            #[serde(default)]
            text: String,
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: SAMPLING_TEMPERATURE,
                max_output_tokens: max_tokens,
            },
        };

        let url = format!("{}?key={}", self.settings.url, self.settings.api_key);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                provider: Self::NAME,
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: Self::NAME,
                status,
                body,
            });
        }

        let generate_response: GenerateResponse =
            response.json().await.map_err(|e| ProviderError::Transport {
                provider: Self::NAME,
                source: e,
            })?;

        let candidate = generate_response
            .candidates
            .first()
            .ok_or(ProviderError::MissingField {
                provider: Self::NAME,
                field: "candidates",
            })?;

        let content = candidate
            .content
            .parts
            .first()
            .map(|part| part.text.clone())
            .ok_or(ProviderError::MissingField {
                provider: Self::NAME,
                field: "candidates[0].content.parts",
            })?;

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: Self::NAME,
            });
        }

        Ok(content)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
