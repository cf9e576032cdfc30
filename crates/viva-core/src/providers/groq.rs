//! Groq client (OpenAI-compatible chat completions)

use super::{ProviderClient, ProviderError, SAMPLING_TEMPERATURE};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Primary provider: fast OpenAI-compatible chat completions
pub struct GroqClient {
    http_client: reqwest::Client,
    settings: ProviderSettings,
}

impl GroqClient {
    const NAME: &'static str = "groq";

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
impl ProviderClient for GroqClient {
    async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct RequestMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<RequestMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: String,
        }

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: SAMPLING_TEMPERATURE,
            max_tokens,
        };

        let response = self
            .http_client
            .post(&self.settings.url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key))
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

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| ProviderError::Transport {
                provider: Self::NAME,
                source: e,
            })?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or(ProviderError::MissingField {
                provider: Self::NAME,
                field: "choices",
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
