use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{AppError, ProviderError};
use crate::language_utils::SupportedLanguage;
use crate::providers::deepl::DeepL;
use crate::providers::deepseek::DeepSeek;
use crate::providers::{CompletionProvider, EngineKind, RetryPolicy, TranslationEngine};
use crate::report;
use crate::translation::quality::{SemanticAnalyzer, ThresholdPolicy};
use crate::translation::{DualEngineTranslator, RoundTripAnalyzer, RoundTripReport, TextChunker};

// @module: Application controller for round-trip analysis

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: DeepL engine, when the mode uses it
    deepl: Option<Arc<dyn TranslationEngine>>,
    // @field: DeepSeek engine, when the mode uses it
    deepseek: Option<Arc<dyn TranslationEngine>>,
    // @field: LLM used for scoring
    llm: Option<Arc<dyn CompletionProvider>>,
    // @field: Show progress bars for chunked texts
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let retry = RetryPolicy::new(config.common.retry_count, config.common.retry_backoff_ms);
        let mode = config.engines.mode;

        let deepl = mode.uses(EngineKind::DeepL).then(|| {
            let settings = &config.engines.deepl;
            Arc::new(DeepL::new(
                settings.api_key.clone(),
                settings.endpoint.clone(),
                settings.timeout_secs,
                retry,
            )) as Arc<dyn TranslationEngine>
        });

        let deepseek_client = {
            let settings = &config.engines.deepseek;
            (!settings.api_key.trim().is_empty()).then(|| {
                Arc::new(
                    DeepSeek::new(settings.api_key.clone(), settings.endpoint.clone(), settings.timeout_secs, retry)
                        .with_model(settings.model.clone())
                        .with_sampling(settings.temperature, settings.max_tokens)
                        .with_enhanced_prompts(config.common.enhanced_prompts),
                )
            })
        };

        let deepseek = deepseek_client
            .clone()
            .filter(|_| mode.uses(EngineKind::DeepSeek))
            .map(|client| client as Arc<dyn TranslationEngine>);
        let llm = deepseek_client.map(|client| client as Arc<dyn CompletionProvider>);

        if deepl.is_none() && deepseek.is_none() {
            return Err(AppError::Config(format!("No translation engine available for mode '{}'", mode)).into());
        }

        Ok(Self::from_parts(config, deepl, deepseek, llm))
    }

    /// Create a controller around already constructed engines
    pub fn from_parts(
        config: Config,
        deepl: Option<Arc<dyn TranslationEngine>>,
        deepseek: Option<Arc<dyn TranslationEngine>>,
        llm: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            config,
            deepl,
            deepseek,
            llm,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the analyzer described by the configuration
    pub fn build_analyzer(&self) -> Result<RoundTripAnalyzer> {
        let analysis = &self.config.analysis;

        let assessor = self.llm.clone().filter(|_| analysis.use_llm_assessment);
        let translator = DualEngineTranslator::new(self.deepl.clone(), self.deepseek.clone())?.with_assessor(assessor);

        let policy = ThresholdPolicy::new(analysis.similarity_threshold);
        let analyzer = match self.llm.clone().filter(|_| analysis.use_llm_analysis) {
            Some(llm) => SemanticAnalyzer::with_llm(llm, policy),
            None => SemanticAnalyzer::heuristic(policy),
        };

        let chunker = TextChunker::new(self.config.chunking.max_chunk_size, self.config.chunking.overlap_size);

        Ok(RoundTripAnalyzer::new(translator, analyzer, chunker)
            .with_concurrency(self.config.chunking.concurrent_requests)
            .with_enhanced_prompts(self.config.common.enhanced_prompts)
            .with_progress(self.show_progress))
    }

    /// Run a round-trip analysis and save the text report if configured
    pub async fn run_analysis(&self, text: &str) -> Result<RoundTripReport> {
        let source = self.config.source().map_err(|e| AppError::Config(e.to_string()))?;
        let target = self.config.target().map_err(|e| AppError::Config(e.to_string()))?;

        let start_time = std::time::Instant::now();
        let analyzer = self.build_analyzer()?;
        let report = analyzer.run(text, source, target).await?;

        info!(
            "Analysis finished in {:.2} seconds",
            start_time.elapsed().as_secs_f64()
        );
        info!("{}", analyzer.translator().usage().summary());

        if self.config.output.save_report {
            let path = &self.config.output.report_path;
            report::save_text_report(&report, path)
                .with_context(|| format!("Failed to save report to {}", path))?;
            info!("Report saved to {}", path);
        }

        Ok(report)
    }

    /// Check every configured engine
    pub async fn test_connections(&self) -> Vec<(EngineKind, Result<(), ProviderError>)> {
        let mut results = Vec::new();
        for engine in [&self.deepl, &self.deepseek].into_iter().flatten() {
            let result = engine.test_connection().await;
            match &result {
                Ok(()) => info!("{} connection OK", engine.kind()),
                Err(e) => warn!("{} connection failed: {}", engine.kind(), e),
            }
            results.push((engine.kind(), result));
        }
        results
    }

    /// Supported languages with their DeepL availability
    pub fn languages() -> Vec<(SupportedLanguage, bool)> {
        SupportedLanguage::ALL
            .iter()
            .map(|language| (*language, language.deepl_supported()))
            .collect()
    }
}
