/*!
 * Mock engines for testing.
 *
 * This module provides scripted engines that never touch the network:
 * - `MockEngine::working()` - tags text with the target code; translating
 *   back strips the tag again, so a round trip restores the original
 * - `MockEngine::slow_first()` - like `working()`, but the first request
 *   is delayed so later requests finish before it
 * - `MockEngine::failing()` - always errors
 * - `MockCompletion` - scripted chat replies for LLM scoring
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{CompletionProvider, EngineKind, EngineTranslation, TranslationEngine, TranslationRequest};

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Tag with `[code] `, or strip a matching tag when translating back
    Working,
    /// Fails on every Nth request (1-based)
    Intermittent { fail_every: usize },
    /// Always fails with a connection error
    Failing,
    /// Returns an empty string
    Empty,
    /// Delays the first request only, otherwise like `Working`
    SlowFirst { delay_ms: u64 },
}

/// Mock translation engine
#[derive(Debug)]
pub struct MockEngine {
    kind: EngineKind,
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<TranslationRequest>>>,
    custom_response: Option<fn(&TranslationRequest) -> String>,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(kind: EngineKind, behavior: MockBehavior) -> Self {
        Self {
            kind,
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working(kind: EngineKind) -> Self {
        Self::new(kind, MockBehavior::Working)
    }

    pub fn slow_first(kind: EngineKind, delay_ms: u64) -> Self {
        Self::new(kind, MockBehavior::SlowFirst { delay_ms })
    }

    pub fn failing(kind: EngineKind) -> Self {
        Self::new(kind, MockBehavior::Failing)
    }

    pub fn empty(kind: EngineKind) -> Self {
        Self::new(kind, MockBehavior::Empty)
    }

    pub fn intermittent(kind: EngineKind, fail_every: usize) -> Self {
        Self::new(kind, MockBehavior::Intermittent { fail_every })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Get the number of requests made
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copies of all requests received so far
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().clone()
    }

    /// Text produced by the `Working` behavior
    pub fn tagged_translation(request: &TranslationRequest) -> String {
        let source_tag = format!("[{}] ", request.source.code());
        match request.text.strip_prefix(&source_tag) {
            Some(original) => original.to_string(),
            None => format!("[{}] {}", request.target.code(), request.text),
        }
    }

    fn respond(&self, request: &TranslationRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::tagged_translation(request),
        }
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<EngineTranslation, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(EngineTranslation {
                text: self.respond(request),
                prompt_tokens: Some(request.text.chars().count() as u64),
                completion_tokens: Some(request.text.chars().count() as u64),
            }),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == 0 {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated intermittent failure on request {}",
                        count
                    )))
                } else {
                    Ok(EngineTranslation::text_only(self.respond(request)))
                }
            }
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated engine failure".to_string(),
            )),
            MockBehavior::Empty => Ok(EngineTranslation::text_only(String::new())),
            MockBehavior::SlowFirst { delay_ms } => {
                if count == 1 {
                    tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                }
                Ok(EngineTranslation::text_only(self.respond(request)))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated engine failure".to_string())),
            _ => Ok(()),
        }
    }
}

/// Scripted chat-completion provider
#[derive(Debug, Default)]
pub struct MockCompletion {
    /// Replies handed out in order; the last one repeats
    replies: Mutex<VecDeque<String>>,
    fail: bool,
    call_count: AtomicUsize,
    /// User prompts received, in order
    prompts: Mutex<Vec<String>>,
}

impl MockCompletion {
    /// Always reply with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::sequence(vec![reply.into()])
    }

    /// Reply with each entry in turn, repeating the last one
    pub fn sequence(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(user.to_string());

        if self.fail {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated completion failure".to_string(),
            });
        }

        let mut replies = self.replies.lock();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.ok_or_else(|| ProviderError::ParseError("No scripted reply".to_string()))
    }
}
