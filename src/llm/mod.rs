//! LLM client module for crewline
//!
//! A thin client over OpenAI-compatible chat completion endpoints (Groq by
//! default). Configuration is passed in explicitly once, at construction, and
//! is read-only afterwards.

pub mod agent;
pub mod error;
pub mod groq;

use std::sync::Arc;

pub use agent::LlmAgent;
pub use error::LLMError;
pub use groq::{ChatMessage, ChatRequest, ChatResponse, CompletionBuilder};

/// Default endpoint root for Groq's OpenAI-compatible API.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";

/// Default model, in provider-prefixed form.
pub const DEFAULT_MODEL: &str = "groq/deepseek-r1-distill-llama-70b";

/// Default cap on generated tokens; the free Groq tier allows about 6000 tokens per minute.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Configuration shared by every agent in a crew.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL (default: https://api.groq.com/openai)
    pub base_url: String,
    /// Model identifier; a leading `groq/` is accepted and stripped on the wire
    pub model: String,
    /// Maximum output tokens per completion
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            temperature: None,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmConfig {
    /// Groq defaults with the given API key.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The model id as the provider expects it.
    pub fn api_model(&self) -> &str {
        self.model.strip_prefix("groq/").unwrap_or(&self.model)
    }

    pub(crate) fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// LLM client wrapper around reqwest::Client
#[derive(Clone)]
pub struct Client {
    /// The underlying HTTP client
    pub(crate) client: reqwest::Client,
    pub(crate) config: Arc<LlmConfig>,
}

impl Client {
    pub fn new(config: LlmConfig) -> Self {
        Client {
            client: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

// ============================================================================
// Deref to reqwest::Client for direct HTTP usage
// ============================================================================

impl std::ops::Deref for Client {
    type Target = reqwest::Client;
    fn deref(&self) -> &Self::Target {
        &self.client
    }
}
