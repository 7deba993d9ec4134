/*!
 * # backtrans - round-trip translation quality analysis
 *
 * A Rust library that estimates translation quality by back-translation.
 *
 * ## Features
 *
 * - Translate text with DeepL and DeepSeek concurrently
 * - Pick the better candidate with an LLM assessment or a feature heuristic
 * - Translate the result back and score semantic consistency
 * - Split long texts into chunks, carrying preceding text as context
 * - Mixed Chinese/English text detection with glossary hints
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Translation and analysis:
 *   - `translation::core`: Dual-engine translation and the round-trip analyzer
 *   - `translation::chunking`: Long-text chunking and merging
 *   - `translation::prompts`: Prompt templates
 *   - `translation::quality`: Similarity scoring, text features and engine selection
 *   - `translation::usage`: Per-engine usage statistics
 * - `providers`: Engine traits and thin clients:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::deepseek`: DeepSeek API client
 *   - `providers::mock`: Scripted engines for tests
 * - `report`: Console, text and JSON report rendering
 * - `file_utils`: Input decoding and report writing
 * - `app_controller`: Main application controller
 * - `language_utils`: Supported languages and ISO code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod report;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t, SupportedLanguage};
pub use translation::{DualEngineTranslator, RoundTripAnalyzer, RoundTripReport};
