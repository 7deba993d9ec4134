/*!
 * Translation engine adapters.
 *
 * The analyzer only talks to engines through two traits:
 * - `TranslationEngine`: translate a piece of text between two languages
 * - `CompletionProvider`: free-form chat completion, used for LLM scoring
 *
 * Thin HTTP adapters exist for DeepL and DeepSeek; `mock` provides scripted
 * engines for tests.
 */

use async_trait::async_trait;
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils::SupportedLanguage;

pub mod deepl;
pub mod deepseek;
pub mod mock;

/// The two translation engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    DeepL,
    DeepSeek,
}

impl EngineKind {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DeepL => "DeepL",
            Self::DeepSeek => "DeepSeek",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::DeepL => "deepl",
            Self::DeepSeek => "deepseek",
        }
    }

    // @returns: The other engine
    pub fn opposite(&self) -> Self {
        match self {
            Self::DeepL => Self::DeepSeek,
            Self::DeepSeek => Self::DeepL,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for EngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "deepseek" => Ok(Self::DeepSeek),
            _ => Err(anyhow::anyhow!("Invalid engine: {}", s)),
        }
    }
}

/// A single translation request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: SupportedLanguage,
    pub target: SupportedLanguage,
    /// Preceding text for continuity, never translated itself
    pub context: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: SupportedLanguage, target: SupportedLanguage) -> Self {
        Self {
            text: text.into(),
            source,
            target,
            context: None,
        }
    }

    /// Attach read-only context; blank context is dropped
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Translation returned by an engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineTranslation {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

impl EngineTranslation {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A translation engine
#[async_trait]
pub trait TranslationEngine: Send + Sync + Debug {
    /// Which engine this is
    fn kind(&self) -> EngineKind;

    /// Translate `request.text` from `request.source` to `request.target`
    async fn translate(&self, request: &TranslationRequest) -> Result<EngineTranslation, ProviderError>;

    /// Check that the engine is reachable and the credentials work
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// A chat-completion endpoint used for LLM judgements
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a system + user prompt pair and return the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Exponential-backoff retry policy shared by the HTTP adapters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Run `operation` until it succeeds, fails permanently or retries run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    error!("{} failed: {} - attempt {}/{}", label, e, attempt + 1, self.max_retries + 1);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }

            attempt += 1;

            if attempt <= self.max_retries {
                tokio::time::sleep(self.backoff_for(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!("{} failed after {} attempts", label, self.max_retries + 1))
        }))
    }
}

/// Map a non-success HTTP status to a provider error
pub fn status_error(engine: EngineKind, status: u16, body: String) -> ProviderError {
    let message = format!("{} API error ({}): {}", engine, status, body);
    match status {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        456 => ProviderError::QuotaExceeded(message),
        _ => ProviderError::ApiError {
            status_code: status,
            message,
        },
    }
}

/// Map a transport error to a provider error
pub fn transport_error(engine: EngineKind, error: reqwest::Error) -> ProviderError {
    ProviderError::ConnectionError(format!("Failed to send request to {} API: {}", engine, error))
}
