/*!
 * Round-trip semantic consistency analysis.
 *
 * This module compares an original text with its back-translation. When an
 * LLM is configured it is asked for a similarity judgement; otherwise, or
 * when the LLM call fails, a character-overlap score is used.
 */

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::providers::{CompletionProvider, EngineKind};
use crate::translation::prompts;
use crate::translation::usage::{TrackedCompletion, UsageTracker};
use crate::translation::quality::similarity::{
    char_jaccard, ConsistencyLevel, SemanticVerdict, ThresholdPolicy,
};

/// How a consistency report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    /// Texts were identical, no scoring needed
    Exact,
    /// Scored by an LLM
    Llm,
    /// Character-overlap fallback
    Fallback,
}

/// Result of comparing an original text with its back-translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Similarity score (0.0-1.0)
    pub score: f32,
    pub is_consistent: bool,
    /// Threshold the score was compared against
    pub threshold: f32,
    pub level: ConsistencyLevel,
    pub verdict: SemanticVerdict,
    /// Confidence in the score (0.0-1.0)
    pub confidence: f32,
    /// Free-text explanation
    pub analysis: String,
    pub is_identical: bool,
    pub method: AnalysisMethod,
    pub original_length: usize,
    pub back_translated_length: usize,
    /// One-line recommendation for the user
    pub suggestion: String,
}

impl ConsistencyReport {
    fn finish(mut self) -> Self {
        self.suggestion = suggestion_for(&self).to_string();
        self
    }
}

fn suggestion_for(report: &ConsistencyReport) -> &'static str {
    if report.is_identical {
        "Back-translation is identical to the original; translation quality is excellent"
    } else if report.verdict == SemanticVerdict::Identical {
        "Meaning is fully preserved; translation quality is excellent"
    } else if report.verdict == SemanticVerdict::Similar {
        "Meaning is largely preserved; translation quality is good"
    } else if report.is_consistent {
        "Translation quality is good and the meaning stays consistent"
    } else {
        "Possible semantic drift; review the translation"
    }
}

/// LLM judgement parsed from a response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlmJudgement {
    pub similarity_score: Option<f32>,
    pub verdict: SemanticVerdict,
    pub analysis: String,
    pub confidence: f32,
}

static SCORE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)similarity(?:[ _]score)?\s*[:：]\s*([0-9]*\.?[0-9]+)").unwrap());
static VERDICT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)semantic[ _]meaning\s*[:：]\s*([A-Za-z]+)").unwrap());
static ANALYSIS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)analysis\s*[:：]\s*(.+)").unwrap());
static CONFIDENCE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)confidence\s*[:：]\s*([0-9]*\.?[0-9]+)").unwrap());

/// Extract a JSON object from an LLM response
///
/// Handles a bare object, a fenced ```json block, and an object embedded in
/// prose (first `{` to last `}`).
pub fn extract_json(response: &str) -> Result<String> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') {
        if let Some(end) = trimmed.rfind('}') {
            return Ok(trimmed[..=end].to_string());
        }
    }

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return Ok(trimmed[start + 7..start + 7 + end].trim().to_string());
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return Ok(trimmed[start..=end].to_string());
        }
    }

    anyhow::bail!("Could not extract JSON from response")
}

/// Parse an LLM similarity response, JSON first, then `label: value` lines
pub fn parse_judgement(response: &str) -> LlmJudgement {
    if let Some(judgement) = try_parse_json(response) {
        return judgement;
    }

    let capture = |re: &Regex| {
        re.captures(response)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    LlmJudgement {
        similarity_score: capture(&SCORE_LINE)
            .and_then(|s| s.parse::<f32>().ok())
            .map(|s| s.clamp(0.0, 1.0)),
        verdict: capture(&VERDICT_LINE)
            .map(|v| SemanticVerdict::parse(&v))
            .unwrap_or_default(),
        analysis: capture(&ANALYSIS_LINE).unwrap_or_else(|| response.trim().to_string()),
        confidence: capture(&CONFIDENCE_LINE)
            .and_then(|s| s.parse::<f32>().ok())
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(0.0),
    }
}

fn try_parse_json(response: &str) -> Option<LlmJudgement> {
    #[derive(Deserialize)]
    struct ParsedResponse {
        similarity_score: Option<serde_json::Value>,
        semantic_meaning: Option<String>,
        analysis: Option<String>,
        confidence: Option<serde_json::Value>,
    }

    fn number(value: Option<serde_json::Value>) -> Option<f32> {
        let value = value?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
            .map(|v| (v as f32).clamp(0.0, 1.0))
    }

    let json = extract_json(response).ok()?;
    let parsed: ParsedResponse = serde_json::from_str(&json).ok()?;

    Some(LlmJudgement {
        similarity_score: number(parsed.similarity_score),
        verdict: parsed
            .semantic_meaning
            .map(|v| SemanticVerdict::parse(&v))
            .unwrap_or_default(),
        analysis: parsed.analysis.unwrap_or_default(),
        confidence: number(parsed.confidence).unwrap_or(0.0),
    })
}

/// Compares original and back-translated text
#[derive(Clone)]
pub struct SemanticAnalyzer {
    llm: Option<Arc<dyn CompletionProvider>>,
    policy: ThresholdPolicy,
}

impl SemanticAnalyzer {
    /// Analyzer that only uses the character-overlap score
    pub fn heuristic(policy: ThresholdPolicy) -> Self {
        Self { llm: None, policy }
    }

    /// Analyzer backed by an LLM
    pub fn with_llm(llm: Arc<dyn CompletionProvider>, policy: ThresholdPolicy) -> Self {
        Self {
            llm: Some(llm),
            policy,
        }
    }

    pub fn uses_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Count the judge's calls as DeepSeek usage in `usage`
    pub fn track_usage(mut self, usage: &UsageTracker) -> Self {
        self.llm = self.llm.map(|llm| TrackedCompletion::wrap(llm, EngineKind::DeepSeek, usage));
        self
    }

    /// Score how well `back_translated` preserves the meaning of `original`
    ///
    /// Never fails: LLM problems degrade to the fallback score.
    pub async fn analyze(
        &self,
        original: &str,
        back_translated: &str,
        source_language: &str,
    ) -> ConsistencyReport {
        if original == back_translated {
            return ConsistencyReport {
                score: 1.0,
                is_consistent: true,
                threshold: 0.5,
                level: ConsistencyLevel::Identical,
                verdict: SemanticVerdict::Identical,
                confidence: 1.0,
                analysis: "Texts are identical".to_string(),
                is_identical: true,
                method: AnalysisMethod::Exact,
                original_length: original.chars().count(),
                back_translated_length: back_translated.chars().count(),
                suggestion: String::new(),
            }
            .finish();
        }

        let Some(llm) = &self.llm else {
            return self.fallback(original, back_translated, "LLM analysis disabled");
        };

        let (system, user) = prompts::semantic_analysis_prompt(original, back_translated, source_language);
        let response = match llm.complete(&system, &user).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Semantic analysis request failed, using character overlap: {}", e);
                return self.fallback(original, back_translated, "LLM analysis unavailable");
            }
        };

        let judgement = parse_judgement(&response);
        let Some(score) = judgement.similarity_score else {
            debug!("No similarity score in analysis response: {}", response);
            return self.fallback(original, back_translated, "LLM response had no similarity score");
        };

        let threshold = self.policy.threshold_for(original, back_translated, judgement.verdict);
        ConsistencyReport {
            score,
            is_consistent: ThresholdPolicy::passes(score, threshold),
            threshold,
            level: ConsistencyLevel::from_score(score),
            verdict: judgement.verdict,
            confidence: judgement.confidence,
            analysis: judgement.analysis,
            is_identical: false,
            method: AnalysisMethod::Llm,
            original_length: original.chars().count(),
            back_translated_length: back_translated.chars().count(),
            suggestion: String::new(),
        }
        .finish()
    }

    fn fallback(&self, original: &str, back_translated: &str, reason: &str) -> ConsistencyReport {
        let score = char_jaccard(original, back_translated);
        let threshold = self.policy.base_threshold;
        ConsistencyReport {
            score,
            is_consistent: ThresholdPolicy::passes(score, threshold),
            threshold,
            level: ConsistencyLevel::from_score(score),
            verdict: SemanticVerdict::Unknown,
            confidence: 0.3,
            analysis: format!("{}; scored by character overlap", reason),
            is_identical: original == back_translated,
            method: AnalysisMethod::Fallback,
            original_length: original.chars().count(),
            back_translated_length: back_translated.chars().count(),
            suggestion: String::new(),
        }
        .finish()
    }
}
