use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ChatConfig {
    /// Read settings from `INTAKE_AI_*` environment variables.
    ///
    /// Returns `None` when no API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("INTAKE_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("INTAKE_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("INTAKE_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout_secs = env::var("INTAKE_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self::new(api_key).with_base_url(base_url).with_model(model).with_timeout(
            Duration::from_secs(timeout_secs),
        ))
    }

    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Minimal chat completions client.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: Option<ChatConfig>,
}

impl ChatClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ChatConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ChatConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.model.as_str())
    }

    /// Send a single user prompt and return the trimmed reply.
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError` when the client is disabled, the request
    /// fails or times out, or the reply is empty.
    pub async fn complete(&self, prompt: &str) -> Result<String, ClassifierError> {
        let config = self.config.as_ref().ok_or(ClassifierError::Disabled)?;

        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ClassifierError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
