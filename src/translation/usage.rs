/*!
 * Per-engine usage statistics.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::ProviderError;
use crate::providers::{CompletionProvider, EngineKind, EngineTranslation};

/// Usage numbers for one engine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineUsage {
    /// Requests sent, including failed ones
    pub requests: u64,
    pub failures: u64,
    /// Characters of source text sent
    pub characters: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Total time spent waiting on the engine
    #[serde(serialize_with = "serialize_millis")]
    pub api_duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl EngineUsage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Shared usage tracker; clones share the same counters
#[derive(Debug, Clone)]
pub struct UsageTracker {
    inner: Arc<Mutex<BTreeMap<&'static str, EngineUsage>>>,
    start_time: Instant,
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BTreeMap::new())),
            start_time: Instant::now(),
        }
    }

    /// Record one engine call; `None` marks a failed call
    pub fn record(
        &self,
        engine: EngineKind,
        characters: usize,
        elapsed: Duration,
        outcome: Option<&EngineTranslation>,
    ) {
        let tokens = outcome.map(|t| (t.prompt_tokens.unwrap_or(0), t.completion_tokens.unwrap_or(0)));
        self.record_call(engine, characters, elapsed, outcome.is_some(), tokens);
    }

    /// Record one chat completion made for scoring
    pub fn record_completion(&self, engine: EngineKind, characters: usize, elapsed: Duration, succeeded: bool) {
        self.record_call(engine, characters, elapsed, succeeded, None);
    }

    fn record_call(
        &self,
        engine: EngineKind,
        characters: usize,
        elapsed: Duration,
        succeeded: bool,
        tokens: Option<(u64, u64)>,
    ) {
        let mut stats = self.inner.lock();
        let usage = stats.entry(engine.display_name()).or_default();
        usage.requests += 1;
        usage.characters += characters as u64;
        usage.api_duration += elapsed;
        if !succeeded {
            usage.failures += 1;
        }
        if let Some((prompt, completion)) = tokens {
            usage.prompt_tokens += prompt;
            usage.completion_tokens += completion;
        }
    }

    /// Snapshot of one engine's usage
    pub fn get(&self, engine: EngineKind) -> EngineUsage {
        self.inner.lock().get(engine.display_name()).cloned().unwrap_or_default()
    }

    /// Snapshot of all engines that were used
    pub fn snapshot(&self) -> BTreeMap<String, EngineUsage> {
        self.inner
            .lock()
            .iter()
            .map(|(name, usage)| (name.to_string(), usage.clone()))
            .collect()
    }

    /// Generate a summary of engine usage
    pub fn summary(&self) -> String {
        let stats = self.inner.lock();
        let mut summary = format!(
            "Engine Usage Summary:\nElapsed time: {:.2} seconds",
            self.start_time.elapsed().as_secs_f64()
        );

        for (name, usage) in stats.iter() {
            summary.push_str(&format!(
                "\n{}:\n  Requests: {} ({} failed)\n  Characters sent: {}\n  Tokens: {} prompt / {} completion\n  API request time: {:.2} seconds",
                name,
                usage.requests,
                usage.failures,
                usage.characters,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.api_duration.as_secs_f64()
            ));
        }

        summary
    }
}

/// Completion provider that records every call in a shared tracker
pub struct TrackedCompletion {
    inner: Arc<dyn CompletionProvider>,
    engine: EngineKind,
    usage: UsageTracker,
}

impl TrackedCompletion {
    /// Wrap `inner`, attributing its calls to `engine`
    pub fn wrap(
        inner: Arc<dyn CompletionProvider>,
        engine: EngineKind,
        usage: &UsageTracker,
    ) -> Arc<dyn CompletionProvider> {
        Arc::new(Self {
            inner,
            engine,
            usage: usage.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for TrackedCompletion {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let start = Instant::now();
        let result = self.inner.complete(system, user).await;
        self.usage.record_completion(
            self.engine,
            system.chars().count() + user.chars().count(),
            start.elapsed(),
            result.is_ok(),
        );
        result
    }
}
