//! External AI provider gateway
//!
//! Two concrete providers distinguished by endpoint, authentication scheme
//! and response envelope, not by behavior. No retries happen here; fallback
//! is the orchestrator's responsibility.

pub mod gemini;
pub mod groq;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

use async_trait::async_trait;
use thiserror::Error;

/// Sampling temperature for every provider. Structured output wants
/// determinism, not creativity.
pub const SAMPLING_TEMPERATURE: f32 = 0.2;

/// Failure of a single provider attempt
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} transport failure: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: &'static str },

    #[error("{provider} response missing {field}")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },
}

/// A service that turns a prompt into free text
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Submit a prompt and return the raw completion text
    async fn invoke(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;

    /// Short provider name used in logs and errors
    fn name(&self) -> &'static str;
}
