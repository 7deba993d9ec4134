/*!
 * Quality estimation for translations.
 *
 * - **Similarity**: character-overlap scoring, consistency levels, dynamic thresholds
 * - **Semantic**: round-trip consistency analysis with an optional LLM judge
 * - **Features**: lexical features of the source text
 * - **Selection**: the heuristic that picks between DeepL and DeepSeek output
 */

pub mod features;
pub mod selection;
pub mod semantic;
pub mod similarity;

// Re-export main types
pub use features::{glossary_hints, Complexity, Formality, TextFeatures};
pub use selection::{Candidates, EngineQuality, EngineSelector, QualityScores, Selection, SelectionMethod};
pub use semantic::{AnalysisMethod, ConsistencyReport, SemanticAnalyzer};
pub use similarity::{char_jaccard, ConsistencyLevel, SemanticVerdict, ThresholdPolicy};
