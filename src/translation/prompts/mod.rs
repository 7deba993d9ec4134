/*!
 * Prompt engineering for translation and scoring.
 *
 * This module provides:
 * - System prompt templates for plain and culture-aware translation
 * - A builder that adds mixed-language handling, glossary hints and chunk context
 * - Prompts for the round-trip similarity judge and the candidate quality judge
 */

pub mod templates;

// Re-export main types
pub use templates::{
    quality_assessment_prompt, semantic_analysis_prompt, translation_prompt, PromptTemplate,
    TranslationPromptBuilder,
};
