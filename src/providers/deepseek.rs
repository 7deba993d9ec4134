use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{
    status_error, transport_error, CompletionProvider, EngineKind, EngineTranslation, RetryPolicy,
    TranslationEngine, TranslationRequest,
};
use crate::translation::prompts;

pub const DEEPSEEK_DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1";
pub const DEEPSEEK_DEFAULT_MODEL: &str = "deepseek-chat";

/// DeepSeek client for the OpenAI-compatible chat API
#[derive(Debug)]
pub struct DeepSeek {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL without a trailing slash
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    /// Use the mixed-language aware prompt
    enhanced_prompts: bool,
    retry: RetryPolicy,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl ChatResponse {
    /// Text of the first choice
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

impl DeepSeek {
    /// Create a new DeepSeek client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            DEEPSEEK_DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint,
            model: DEEPSEEK_DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            enhanced_prompts: true,
            retry,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_enhanced_prompts(mut self, enhanced: bool) -> Self {
        self.enhanced_prompts = enhanced;
        self
    }

    /// Send a chat request with retries
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.retry.run("DeepSeek chat", || self.send_chat(request)).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(EngineKind::DeepSeek, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepSeek API error ({}): {}", status, error_text);
            return Err(status_error(EngineKind::DeepSeek, status.as_u16(), error_text));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepSeek API response: {}", e)))
    }

    fn request(&self, system: &str, user: &str) -> ChatRequest {
        ChatRequest::new(&self.model)
            .add_message("system", system)
            .add_message("user", user)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl TranslationEngine for DeepSeek {
    fn kind(&self) -> EngineKind {
        EngineKind::DeepSeek
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<EngineTranslation, ProviderError> {
        let (system, user) = prompts::translation_prompt(request, self.enhanced_prompts);
        debug!(
            "DeepSeek translate {} -> {} ({} chars, enhanced prompt: {})",
            request.source,
            request.target,
            request.text.chars().count(),
            self.enhanced_prompts
        );

        let response = self.chat(&self.request(&system, &user)).await?;
        let text = response
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::ParseError("DeepSeek returned an empty translation".to_string()))?;

        Ok(EngineTranslation {
            text: text.to_string(),
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatRequest::new(&self.model).add_message("user", "Hello").max_tokens(10);
        self.send_chat(&request).await?;
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for DeepSeek {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let response = self.chat(&self.request(system, user)).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ProviderError::ParseError("DeepSeek returned no choices".to_string()))
    }
}
