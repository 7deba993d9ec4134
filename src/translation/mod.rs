/*!
 * Dual-engine translation and round-trip quality analysis.
 *
 * This module is split into several submodules:
 *
 * - `core`: dual-engine translation and the round-trip analyzer
 * - `chunking`: long-text splitting and merging
 * - `prompts`: prompt templates for translation and LLM scoring
 * - `quality`: similarity scoring, text features and engine selection
 * - `usage`: per-engine request statistics
 */

// Re-export main types for easier usage
pub use self::chunking::{merge_translations, TextChunk, TextChunker};
pub use self::core::{ChunkRecord, DualEngineTranslator, DualTranslation, EngineOutcome, RoundTripAnalyzer, RoundTripReport};
pub use self::usage::{EngineUsage, UsageTracker};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};

// Submodules
pub mod chunking;
pub mod core;
pub mod prompts;
pub mod quality;
pub mod usage;
