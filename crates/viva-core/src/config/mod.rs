//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Primary AI provider (Groq, OpenAI-compatible chat completions)
    #[serde(default = "ProviderSettings::groq_defaults")]
    pub groq: ProviderSettings,

    /// Secondary AI provider (Gemini generateContent)
    #[serde(default = "ProviderSettings::gemini_defaults")]
    pub gemini: ProviderSettings,

    /// Evaluation pipeline tunables
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq: ProviderSettings::groq_defaults(),
            gemini: ProviderSettings::gemini_defaults(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

/// Connection settings for one external AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Whether this provider participates in the fallback chain
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Endpoint URL
    pub url: String,

    /// Model name
    pub model: String,

    /// API key (empty means unconfigured; calls will fail and fall through)
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Groq defaults, overridable via VIVA_GROQ_* environment variables
    pub fn groq_defaults() -> Self {
        Self {
            enabled: env_flag("VIVA_GROQ_ENABLED", true),
            url: std::env::var("VIVA_GROQ_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string()),
            model: std::env::var("VIVA_GROQ_MODEL")
                .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string()),
            api_key: std::env::var("VIVA_GROQ_API_KEY").unwrap_or_default(),
            timeout_secs: default_timeout(),
        }
    }

    /// Gemini defaults, overridable via VIVA_GEMINI_* environment variables
    pub fn gemini_defaults() -> Self {
        Self {
            enabled: env_flag("VIVA_GEMINI_ENABLED", true),
            url: std::env::var("VIVA_GEMINI_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
                    .to_string()
            }),
            model: std::env::var("VIVA_GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            api_key: std::env::var("VIVA_GEMINI_API_KEY").unwrap_or_default(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Evaluation pipeline tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Wall-clock budget for a full evaluation in seconds
    #[serde(default = "default_budget")]
    pub budget_secs: u64,

    /// Token budget for evaluation responses
    #[serde(default = "default_evaluation_tokens")]
    pub max_tokens: u32,

    /// Token budget for question generation responses
    #[serde(default = "default_question_tokens")]
    pub question_max_tokens: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            budget_secs: default_budget(),
            max_tokens: default_evaluation_tokens(),
            question_max_tokens: default_question_tokens(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn default_enabled() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_budget() -> u64 {
    60
}

fn default_evaluation_tokens() -> u32 {
    8192
}

fn default_question_tokens() -> u32 {
    4096
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
