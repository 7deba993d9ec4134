/*!
 * Dual-engine translation and round-trip analysis.
 *
 * `DualEngineTranslator` sends one text to every configured engine at once
 * and keeps the better candidate. `RoundTripAnalyzer` translates a text to
 * the target language, translates the result back, and scores how much of
 * the meaning survived. Long texts go through the chunker; each chunk is
 * back-translated by the engine that did not produce its forward translation.
 */

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{ProviderError, TranslationError};
use crate::language_utils::SupportedLanguage;
use crate::providers::{CompletionProvider, EngineKind, EngineTranslation, TranslationEngine, TranslationRequest};
use crate::translation::chunking::{merge_translations, TextChunk, TextChunker};
use crate::translation::prompts;
use crate::translation::quality::{
    Candidates, ConsistencyReport, EngineSelector, QualityScores, SelectionMethod, SemanticAnalyzer, TextFeatures,
};
use crate::translation::usage::{EngineUsage, TrackedCompletion, UsageTracker};

/// What one engine returned for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOutcome {
    pub engine: EngineKind,
    pub text: Option<String>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Result of running a text through both engines
#[derive(Debug, Clone, Serialize)]
pub struct DualTranslation {
    /// The selected translation
    pub best: String,
    pub method: SelectionMethod,
    pub confidence: f32,
    pub deepl: Option<EngineOutcome>,
    pub deepseek: Option<EngineOutcome>,
    pub features: TextFeatures,
}

impl DualTranslation {
    /// Engine whose output was kept
    pub fn produced_by(&self) -> Option<EngineKind> {
        self.method.engine()
    }
}

/// Runs DeepL and DeepSeek side by side and keeps the better output
#[derive(Clone)]
pub struct DualEngineTranslator {
    deepl: Option<Arc<dyn TranslationEngine>>,
    deepseek: Option<Arc<dyn TranslationEngine>>,
    /// LLM that scores the two candidates
    assessor: Option<Arc<dyn CompletionProvider>>,
    selector: EngineSelector,
    usage: UsageTracker,
}

impl DualEngineTranslator {
    pub fn new(
        deepl: Option<Arc<dyn TranslationEngine>>,
        deepseek: Option<Arc<dyn TranslationEngine>>,
    ) -> Result<Self, TranslationError> {
        if deepl.is_none() && deepseek.is_none() {
            return Err(TranslationError::InvalidInput("No translation engine configured".to_string()));
        }
        Ok(Self {
            deepl,
            deepseek,
            assessor: None,
            selector: EngineSelector::new(),
            usage: UsageTracker::new(),
        })
    }

    /// Score candidates with an LLM instead of the feature defaults
    pub fn with_assessor(mut self, assessor: Option<Arc<dyn CompletionProvider>>) -> Self {
        self.assessor = assessor.map(|llm| TrackedCompletion::wrap(llm, EngineKind::DeepSeek, &self.usage));
        self
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub fn has_engine(&self, kind: EngineKind) -> bool {
        self.engine(kind).is_some()
    }

    fn engine(&self, kind: EngineKind) -> Option<&Arc<dyn TranslationEngine>> {
        match kind {
            EngineKind::DeepL => self.deepl.as_ref(),
            EngineKind::DeepSeek => self.deepseek.as_ref(),
        }
    }

    /// Human-readable list of the configured engines
    pub fn engines_label(&self) -> String {
        match (&self.deepl, &self.deepseek) {
            (Some(_), Some(_)) => "DeepL + DeepSeek".to_string(),
            (Some(_), None) => "DeepL".to_string(),
            (None, Some(_)) => "DeepSeek".to_string(),
            (None, None) => "none".to_string(),
        }
    }

    /// Translate with every configured engine and select the best result
    pub async fn translate(
        &self,
        text: &str,
        source: SupportedLanguage,
        target: SupportedLanguage,
        context: Option<String>,
    ) -> Result<DualTranslation, TranslationError> {
        let request = TranslationRequest::new(text, source, target).with_context(context);

        let (deepl, deepseek) = tokio::join!(
            self.run_engine(self.deepl.as_ref(), &request),
            self.run_engine(self.deepseek.as_ref(), &request)
        );

        let features = TextFeatures::analyze(text);
        let candidates = Candidates::new(
            deepl.as_ref().and_then(|o| o.text.as_deref()),
            deepseek.as_ref().and_then(|o| o.text.as_deref()),
        );

        let selection = match candidates.both() {
            Some((deepl_text, deepseek_text)) => {
                match &self.assessor {
                    Some(assessor) => {
                        let (system, user) = prompts::quality_assessment_prompt(
                            text,
                            deepl_text,
                            deepseek_text,
                            source.english_name(),
                            target.english_name(),
                            &features,
                        );
                        match assessor.complete(&system, &user).await {
                            Ok(response) => {
                                let scores = QualityScores::parse(&response);
                                if scores.parsed_fields == 0 {
                                    debug!("Quality assessment could not be parsed, selecting by length");
                                    self.selector.select_by_length(text, &candidates)
                                } else {
                                    self.selector.select(&candidates, &features, &scores)
                                }
                            }
                            Err(e) => {
                                warn!("Quality assessment failed, using feature defaults: {}", e);
                                self.selector.select(&candidates, &features, &QualityScores::from_features(&features))
                            }
                        }
                    }
                    None => self.selector.select(&candidates, &features, &QualityScores::from_features(&features)),
                }
            }
            None => self
                .selector
                .select(&candidates, &features, &QualityScores::from_features(&features)),
        };

        if selection.method == SelectionMethod::Failed {
            let errors: Vec<String> = [&deepl, &deepseek]
                .into_iter()
                .flatten()
                .map(|o| format!("{}: {}", o.engine, o.error.as_deref().unwrap_or("empty translation")))
                .collect();
            return Err(TranslationError::AllEnginesFailed(errors.join("; ")));
        }

        debug!(
            "Selected {} translation ({}, confidence {:.2})",
            selection.method.engine().map(|e| e.display_name()).unwrap_or("no"),
            selection.method,
            selection.confidence
        );

        Ok(DualTranslation {
            best: selection.text,
            method: selection.method,
            confidence: selection.confidence,
            deepl,
            deepseek,
            features,
        })
    }

    /// Back-translate a forward result with the engine that did not produce it
    ///
    /// Falls back to the producing engine when the opposite one is missing or fails.
    pub async fn back_translate_chunk(
        &self,
        forward: &DualTranslation,
        source: SupportedLanguage,
        target: SupportedLanguage,
        context: Option<String>,
    ) -> Result<(String, EngineKind), TranslationError> {
        let preferred = forward
            .produced_by()
            .map(|kind| kind.opposite())
            .unwrap_or(EngineKind::DeepL);
        let request = TranslationRequest::new(forward.best.as_str(), source, target).with_context(context);

        let mut errors = Vec::new();
        for kind in [preferred, preferred.opposite()] {
            let Some(engine) = self.engine(kind) else {
                continue;
            };
            match self.call_engine(engine.as_ref(), &request).await {
                Ok(translation) if !translation.text.trim().is_empty() => {
                    return Ok((translation.text, kind));
                }
                Ok(_) => errors.push(format!("{}: empty translation", kind)),
                Err(e) => {
                    warn!("{} back-translation failed: {}", kind, e);
                    errors.push(format!("{}: {}", kind, e));
                }
            }
        }

        Err(TranslationError::AllEnginesFailed(errors.join("; ")))
    }

    async fn run_engine(
        &self,
        engine: Option<&Arc<dyn TranslationEngine>>,
        request: &TranslationRequest,
    ) -> Option<EngineOutcome> {
        let engine = engine?;
        let start = Instant::now();
        let result = self.call_engine(engine.as_ref(), request).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        Some(match result {
            Ok(translation) => EngineOutcome {
                engine: engine.kind(),
                text: Some(translation.text),
                error: None,
                elapsed_ms,
            },
            Err(e) => {
                warn!("{} translation failed: {}", engine.kind(), e);
                EngineOutcome {
                    engine: engine.kind(),
                    text: None,
                    error: Some(e.to_string()),
                    elapsed_ms,
                }
            }
        })
    }

    async fn call_engine(
        &self,
        engine: &dyn TranslationEngine,
        request: &TranslationRequest,
    ) -> Result<EngineTranslation, ProviderError> {
        let start = Instant::now();
        let result = engine.translate(request).await;
        self.usage.record(
            engine.kind(),
            request.text.chars().count(),
            start.elapsed(),
            result.as_ref().ok(),
        );
        result
    }
}

/// How one chunk was translated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkRecord {
    pub index: usize,
    pub method: SelectionMethod,
    pub confidence: f32,
    /// Engine that produced the back-translation
    pub back_engine: Option<EngineKind>,
}

/// Full outcome of a round-trip analysis
#[derive(Debug, Clone, Serialize)]
pub struct RoundTripReport {
    pub original_text: String,
    pub source_language: SupportedLanguage,
    pub target_language: SupportedLanguage,
    pub target_translation: String,
    pub back_translation: String,
    pub consistency: ConsistencyReport,
    pub features: TextFeatures,
    pub is_long_text: bool,
    /// Length of the original in characters
    pub text_length: usize,
    pub chunks_count: usize,
    pub chunk_methods: Vec<ChunkRecord>,
    /// Chunker settings the text was split with
    pub max_chunk_size: usize,
    pub overlap_size: usize,
    pub engines: String,
    pub enhanced_prompts: bool,
    pub usage: BTreeMap<String, EngineUsage>,
}

/// Translates a text forward and back and scores the result
pub struct RoundTripAnalyzer {
    translator: DualEngineTranslator,
    analyzer: SemanticAnalyzer,
    chunker: TextChunker,
    concurrent_chunks: usize,
    enhanced_prompts: bool,
    show_progress: bool,
}

impl RoundTripAnalyzer {
    pub fn new(translator: DualEngineTranslator, analyzer: SemanticAnalyzer, chunker: TextChunker) -> Self {
        let analyzer = analyzer.track_usage(translator.usage());
        Self {
            translator,
            analyzer,
            chunker,
            concurrent_chunks: 1,
            enhanced_prompts: true,
            show_progress: false,
        }
    }

    /// Number of chunks translated at the same time
    pub fn with_concurrency(mut self, concurrent_chunks: usize) -> Self {
        self.concurrent_chunks = concurrent_chunks.max(1);
        self
    }

    /// Whether the engines were set up with the enhanced prompts
    pub fn with_enhanced_prompts(mut self, enhanced: bool) -> Self {
        self.enhanced_prompts = enhanced;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn translator(&self) -> &DualEngineTranslator {
        &self.translator
    }

    /// Run the full round trip for `text`
    pub async fn run(
        &self,
        text: &str,
        source: SupportedLanguage,
        target: SupportedLanguage,
    ) -> Result<RoundTripReport, TranslationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslationError::InvalidInput("Text to analyze is empty".to_string()));
        }
        if source == target {
            return Err(TranslationError::InvalidInput(format!(
                "Source and target language are both {}",
                source
            )));
        }

        let is_long_text = self.chunker.is_long_text(text);
        let text_length = text.chars().count();
        info!(
            "Analyzing {} characters {} -> {} with {}{}",
            text_length,
            source,
            target,
            self.translator.engines_label(),
            if is_long_text { " (chunked)" } else { "" }
        );

        let (target_translation, back_translation, chunk_methods) = if is_long_text {
            self.run_chunked(text, source, target).await?
        } else {
            self.run_whole(text, source, target).await?
        };

        let consistency = self
            .analyzer
            .analyze(text, &back_translation, source.english_name())
            .await;

        info!(
            "Consistency score {:.2} ({}), consistent: {}",
            consistency.score, consistency.level, consistency.is_consistent
        );

        Ok(RoundTripReport {
            original_text: text.to_string(),
            source_language: source,
            target_language: target,
            target_translation,
            back_translation,
            consistency,
            features: TextFeatures::analyze(text),
            is_long_text,
            text_length,
            chunks_count: chunk_methods.len(),
            chunk_methods,
            max_chunk_size: self.chunker.max_chunk_size(),
            overlap_size: self.chunker.overlap_size(),
            engines: self.translator.engines_label(),
            enhanced_prompts: self.enhanced_prompts,
            usage: self.translator.usage().snapshot(),
        })
    }

    async fn run_whole(
        &self,
        text: &str,
        source: SupportedLanguage,
        target: SupportedLanguage,
    ) -> Result<(String, String, Vec<ChunkRecord>), TranslationError> {
        let forward = self.translator.translate(text, source, target, None).await?;
        let back = self.translator.translate(&forward.best, target, source, None).await?;

        let record = ChunkRecord {
            index: 0,
            method: forward.method,
            confidence: forward.confidence,
            back_engine: back.produced_by(),
        };
        Ok((forward.best, back.best, vec![record]))
    }

    async fn run_chunked(
        &self,
        text: &str,
        source: SupportedLanguage,
        target: SupportedLanguage,
    ) -> Result<(String, String, Vec<ChunkRecord>), TranslationError> {
        let chunks = self.chunker.split(text);
        info!("Split text into {} chunks", chunks.len());

        let progress = self.progress_bar(chunks.len() as u64 * 2);
        let progress = &progress;

        progress.set_message("Translating");
        let forward: Vec<DualTranslation> = stream::iter(chunks.iter())
            .map(|chunk| async move {
                let result = self
                    .translator
                    .translate(chunk.content(), source, target, chunk.context.clone())
                    .await
                    .map_err(|e| chunk_error(chunk, e));
                progress.inc(1);
                result
            })
            .buffered(self.concurrent_chunks)
            .try_collect()
            .await
            .inspect_err(|_| progress.abandon())?;

        // Back-translation context is the tail of the previous translated chunk
        let overlap = self.chunker.overlap_size();
        let contexts: Vec<Option<String>> = std::iter::once(None)
            .chain(forward.iter().map(|f| Some(tail_chars(&f.best, overlap))))
            .take(forward.len())
            .collect();

        progress.set_message("Back-translating");
        let back: Vec<(String, EngineKind)> = stream::iter(chunks.iter().zip(forward.iter()).zip(contexts))
            .map(|((chunk, translated), context)| async move {
                let result = self
                    .translator
                    .back_translate_chunk(translated, target, source, context)
                    .await
                    .map_err(|e| chunk_error(chunk, e));
                progress.inc(1);
                result
            })
            .buffered(self.concurrent_chunks)
            .try_collect()
            .await
            .inspect_err(|_| progress.abandon())?;

        progress.finish_and_clear();

        let records = chunks
            .iter()
            .zip(forward.iter())
            .zip(back.iter())
            .map(|((chunk, f), (_, engine))| ChunkRecord {
                index: chunk.index,
                method: f.method,
                confidence: f.confidence,
                back_engine: Some(*engine),
            })
            .collect();

        let target_translation = merge_translations(&forward.iter().map(|f| f.best.as_str()).collect::<Vec<_>>());
        let back_translation = merge_translations(&back.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>());

        Ok((target_translation, back_translation, records))
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}

fn chunk_error(chunk: &TextChunk, error: TranslationError) -> TranslationError {
    TranslationError::Chunk {
        index: chunk.index,
        message: error.to_string(),
    }
}

// @returns: Last `count` characters of `text`, trimmed
fn tail_chars(text: &str, count: usize) -> String {
    let len = text.chars().count();
    text.chars().skip(len.saturating_sub(count)).collect::<String>().trim().to_string()
}
