use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::language_utils::SupportedLanguage;
use crate::providers::deepseek::{DEEPSEEK_DEFAULT_ENDPOINT, DEEPSEEK_DEFAULT_MODEL};
use crate::providers::EngineKind;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language (name, Chinese label or ISO code)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language (name, Chinese label or ISO code)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Engine selection and credentials
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Settings shared by both engines
    #[serde(default)]
    pub common: CommonConfig,

    /// Long-text chunking
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Quality analysis
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Which engines take part in a translation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    // @mode: DeepL and DeepSeek side by side
    #[default]
    Dual,
    // @mode: DeepSeek only
    DeepSeek,
    // @mode: DeepL only
    DeepL,
}

impl EngineMode {
    // @returns: Capitalized mode name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Dual => "DeepL + DeepSeek",
            Self::DeepSeek => "DeepSeek",
            Self::DeepL => "DeepL",
        }
    }

    // @returns: Whether the mode uses the given engine
    pub fn uses(&self, engine: EngineKind) -> bool {
        match self {
            Self::Dual => true,
            Self::DeepSeek => engine == EngineKind::DeepSeek,
            Self::DeepL => engine == EngineKind::DeepL,
        }
    }
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Dual => "dual",
            Self::DeepSeek => "deepseek",
            Self::DeepL => "deepl",
        };
        write!(f, "{}", id)
    }
}

impl std::str::FromStr for EngineMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dual" | "both" => Ok(Self::Dual),
            "deepseek" => Ok(Self::DeepSeek),
            "deepl" => Ok(Self::DeepL),
            _ => Err(anyhow!("Invalid engine mode: {}", s)),
        }
    }
}

/// Engine configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EnginesConfig {
    #[serde(default)]
    pub mode: EngineMode,

    #[serde(default)]
    pub deepseek: DeepSeekConfig,

    #[serde(default)]
    pub deepl: DeepLConfig,
}

/// DeepSeek service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeepSeekConfig {
    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_deepseek_endpoint")]
    pub endpoint: String,

    // @field: Model name
    #[serde(default = "default_deepseek_model")]
    pub model: String,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Timeout seconds
    #[serde(default = "default_deepseek_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_deepseek_endpoint(),
            model: default_deepseek_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_deepseek_timeout_secs(),
        }
    }
}

/// DeepL service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeepLConfig {
    // @field: API key; keys ending in ":fx" use the free endpoint
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL; empty picks the endpoint from the key
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_deepl_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_deepl_timeout_secs(),
        }
    }
}

/// Settings shared by both engines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Culture and mixed-language aware DeepSeek prompts
    #[serde(default = "default_true")]
    pub enhanced_prompts: bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            enhanced_prompts: true,
        }
    }
}

/// Long-text chunking
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Texts longer than this many characters are chunked
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Characters of preceding text sent as context
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,

    /// Chunks translated at the same time
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            overlap_size: default_overlap_size(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Quality analysis
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Base similarity threshold (0.0 to 1.0)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Ask DeepSeek to judge round-trip similarity
    #[serde(default = "default_true")]
    pub use_llm_analysis: bool,

    /// Ask DeepSeek to score the two candidates
    #[serde(default = "default_true")]
    pub use_llm_assessment: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            use_llm_analysis: true,
            use_llm_assessment: true,
        }
    }
}

/// Report output
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_report_path")]
    pub report_path: String,

    #[serde(default = "default_true")]
    pub save_report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            save_report: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "Chinese".to_string()
}

fn default_target_language() -> String {
    "English".to_string()
}

fn default_deepseek_endpoint() -> String {
    DEEPSEEK_DEFAULT_ENDPOINT.to_string()
}

fn default_deepseek_model() -> String {
    DEEPSEEK_DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_deepseek_timeout_secs() -> u64 {
    60
}

fn default_deepl_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_max_chunk_size() -> usize {
    crate::translation::chunking::DEFAULT_MAX_CHUNK_SIZE
}

fn default_overlap_size() -> usize {
    crate::translation::chunking::DEFAULT_OVERLAP_SIZE
}

fn default_concurrent_requests() -> usize {
    2
}

fn default_similarity_threshold() -> f32 {
    crate::translation::quality::similarity::DEFAULT_SIMILARITY_THRESHOLD
}

fn default_report_path() -> String {
    "output.txt".to_string()
}

impl Config {
    /// Load a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| anyhow!("Failed to open config file {:?}: {}", path, e))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| anyhow!("Failed to write config file {:?}: {}", path, e))
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_with(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using `lookup`; blank values are ignored
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("DEEPSEEK_API_KEY") {
            self.engines.deepseek.api_key = key;
        }
        if let Some(url) = get("DEEPSEEK_BASE_URL") {
            self.engines.deepseek.endpoint = url;
        }
        if let Some(key) = get("DEEPL_API_KEY") {
            self.engines.deepl.api_key = key;
        }
        if let Some(url) = get("DEEPL_BASE_URL") {
            self.engines.deepl.endpoint = url;
        }
    }

    pub fn source(&self) -> Result<SupportedLanguage> {
        self.source_language
            .parse()
            .map_err(|e| anyhow!("Unsupported source language '{}': {}", self.source_language, e))
    }

    pub fn target(&self) -> Result<SupportedLanguage> {
        self.target_language
            .parse()
            .map_err(|e| anyhow!("Unsupported target language '{}': {}", self.target_language, e))
    }

    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let source = self.source()?;
        let target = self.target()?;
        if source == target {
            return Err(anyhow!("Source and target language must differ (both are {})", source));
        }

        // Validate API keys for the engines in use
        let mode = self.engines.mode;
        if mode.uses(EngineKind::DeepSeek) && self.engines.deepseek.api_key.trim().is_empty() {
            return Err(anyhow!("DeepSeek API key is required for engine mode '{}'", mode));
        }
        if mode.uses(EngineKind::DeepL) && self.engines.deepl.api_key.trim().is_empty() {
            return Err(anyhow!("DeepL API key is required for engine mode '{}'", mode));
        }

        if mode == EngineMode::DeepL {
            for language in [source, target] {
                if !language.deepl_supported() {
                    return Err(anyhow!("DeepL does not support {}; use dual or deepseek mode", language));
                }
            }
        }

        validate_endpoint("DeepSeek", &self.engines.deepseek.endpoint)?;
        if !self.engines.deepl.endpoint.is_empty() {
            validate_endpoint("DeepL", &self.engines.deepl.endpoint)?;
        }

        if self.chunking.max_chunk_size == 0 {
            return Err(anyhow!("chunking.max_chunk_size must be greater than 0"));
        }
        if self.chunking.overlap_size >= self.chunking.max_chunk_size {
            return Err(anyhow!("chunking.overlap_size must be smaller than chunking.max_chunk_size"));
        }
        if self.chunking.concurrent_requests == 0 {
            return Err(anyhow!("chunking.concurrent_requests must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.analysis.similarity_threshold) {
            return Err(anyhow!("analysis.similarity_threshold must be between 0.0 and 1.0"));
        }
        if !(0.0..=2.0).contains(&self.engines.deepseek.temperature) {
            return Err(anyhow!("engines.deepseek.temperature must be between 0.0 and 2.0"));
        }

        Ok(())
    }
}

fn validate_endpoint(engine: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint).map_err(|e| anyhow!("Invalid {} endpoint '{}': {}", engine, endpoint, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(anyhow!("Invalid {} endpoint scheme '{}'", engine, scheme)),
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            engines: EnginesConfig::default(),
            common: CommonConfig::default(),
            chunking: ChunkingConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
