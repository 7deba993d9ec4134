/*!
 * Engine-selection heuristic.
 *
 * Given the candidate translations from DeepL and DeepSeek, decide which one
 * to keep. Quality scores come either from an LLM assessment or from
 * feature-based defaults. When the scores are close, the text features
 * decide.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::providers::EngineKind;
use crate::translation::quality::features::TextFeatures;
use crate::translation::quality::semantic::extract_json;

/// Overall-score gap above which the higher-scored engine wins outright
pub const DECISIVE_SCORE_GAP: f32 = 0.2;

/// Texts shorter than this go to DeepL under the length fallback
pub const SHORT_TEXT_CHARS: usize = 50;

/// Why a candidate was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    DeeplOnly,
    DeepseekOnly,
    Failed,
    DeeplSelected,
    DeepseekSelected,
    DeepseekMixedLanguage,
    DeepseekCultural,
    DeeplTechnical,
    DeeplFormal,
    DeeplDefault,
    DeepseekDefault,
    DeeplShortText,
    DeepseekLongText,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeeplOnly => "deepl_only",
            Self::DeepseekOnly => "deepseek_only",
            Self::Failed => "failed",
            Self::DeeplSelected => "deepl_selected",
            Self::DeepseekSelected => "deepseek_selected",
            Self::DeepseekMixedLanguage => "deepseek_mixed_language",
            Self::DeepseekCultural => "deepseek_cultural",
            Self::DeeplTechnical => "deepl_technical",
            Self::DeeplFormal => "deepl_formal",
            Self::DeeplDefault => "deepl_default",
            Self::DeepseekDefault => "deepseek_default",
            Self::DeeplShortText => "deepl_short_text",
            Self::DeepseekLongText => "deepseek_long_text",
        }
    }

    /// Engine whose output was kept, if any
    pub fn engine(&self) -> Option<EngineKind> {
        match self {
            Self::Failed => None,
            Self::DeeplOnly
            | Self::DeeplSelected
            | Self::DeeplTechnical
            | Self::DeeplFormal
            | Self::DeeplDefault
            | Self::DeeplShortText => Some(EngineKind::DeepL),
            _ => Some(EngineKind::DeepSeek),
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quality estimate of one engine's translation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineQuality {
    pub accuracy: f32,
    pub fluency: f32,
    pub cultural_adaptation: f32,
    pub completeness: f32,
    pub overall: f32,
}

impl EngineQuality {
    /// Build a quality estimate with the weighted overall score
    pub fn weighted(accuracy: f32, fluency: f32, cultural_adaptation: f32, completeness: f32) -> Self {
        let mut quality = Self {
            accuracy,
            fluency,
            cultural_adaptation,
            completeness,
            overall: 0.0,
        };
        quality.recompute_overall();
        quality
    }

    fn recompute_overall(&mut self) {
        self.overall = self.accuracy * 0.3
            + self.fluency * 0.25
            + self.cultural_adaptation * 0.25
            + self.completeness * 0.2;
    }
}

impl Default for EngineQuality {
    fn default() -> Self {
        Self::weighted(0.5, 0.5, 0.5, 0.5)
    }
}

/// Quality estimates for both engines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub deepl: EngineQuality,
    pub deepseek: EngineQuality,
    /// Number of score fields recognised in an LLM assessment
    #[serde(default)]
    pub parsed_fields: usize,
}

#[derive(Clone, Copy)]
enum Dimension {
    Accuracy,
    Fluency,
    Cultural,
    Completeness,
}

impl Dimension {
    fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_start_matches(['-', '*', ' ']).to_lowercase();
        if label.starts_with("accuracy") {
            Some(Self::Accuracy)
        } else if label.starts_with("fluency") {
            Some(Self::Fluency)
        } else if label.starts_with("cultural") {
            Some(Self::Cultural)
        } else if label.starts_with("completeness") {
            Some(Self::Completeness)
        } else {
            None
        }
    }

    fn set(&self, quality: &mut EngineQuality, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match self {
            Self::Accuracy => quality.accuracy = value,
            Self::Fluency => quality.fluency = value,
            Self::Cultural => quality.cultural_adaptation = value,
            Self::Completeness => quality.completeness = value,
        }
    }
}

impl QualityScores {
    /// Feature-based default scores used when no LLM assessment is available
    pub fn from_features(features: &TextFeatures) -> Self {
        let mut deepl = EngineQuality {
            accuracy: 0.7,
            fluency: 0.8,
            cultural_adaptation: 0.6,
            completeness: 0.7,
            overall: 0.7,
        };
        let mut deepseek = EngineQuality {
            accuracy: 0.7,
            fluency: 0.7,
            cultural_adaptation: 0.8,
            completeness: 0.7,
            overall: 0.7,
        };

        if features.technical_terms {
            deepl.accuracy += 0.1;
            deepl.overall += 0.1;
        } else if features.cultural_elements {
            deepseek.cultural_adaptation += 0.1;
            deepseek.overall += 0.1;
        }

        if features.is_formal() {
            deepl.fluency += 0.1;
            deepl.overall += 0.1;
        }

        Self {
            deepl,
            deepseek,
            parsed_fields: 0,
        }
    }

    /// Parse an LLM assessment
    ///
    /// Accepts the JSON shape requested by the assessment prompt or a
    /// line-oriented `DeepL:` / `- accuracy: 0.8` layout. Missing dimensions
    /// stay at 0.5; `parsed_fields` counts what was recognised.
    pub fn parse(response: &str) -> Self {
        if let Some(scores) = Self::parse_json(response) {
            return scores;
        }
        Self::parse_lines(response)
    }

    fn parse_json(response: &str) -> Option<Self> {
        let json = extract_json(response).ok()?;
        let value: serde_json::Value = serde_json::from_str(&json).ok()?;
        let object = value.as_object()?;

        let mut scores = Self::neutral();
        for (key, engine_value) in object {
            let target = match key.to_lowercase().as_str() {
                "deepl" => &mut scores.deepl,
                "deepseek" => &mut scores.deepseek,
                _ => continue,
            };
            let Some(fields) = engine_value.as_object() else {
                continue;
            };
            for (label, raw) in fields {
                let Some(dimension) = Dimension::from_label(label) else {
                    continue;
                };
                let number = raw
                    .as_f64()
                    .or_else(|| raw.as_str().and_then(|s| s.trim().parse::<f64>().ok()));
                if let Some(number) = number {
                    dimension.set(target, number as f32);
                    scores.parsed_fields += 1;
                }
            }
        }

        scores.deepl.recompute_overall();
        scores.deepseek.recompute_overall();
        Some(scores)
    }

    fn parse_lines(response: &str) -> Self {
        let mut scores = Self::neutral();
        let mut current: Option<EngineKind> = None;

        for line in response.lines() {
            let trimmed = line.trim();
            let lowered = trimmed.to_lowercase();

            if let Some((label, value)) = lowered.split_once(':') {
                // "DeepL accuracy: 0.9" names the engine on the score line itself
                let inline_engine = engine_named_in(label);
                let bare_label = label.replace("deepseek", "").replace("deepl", "");
                if let Some(dimension) = Dimension::from_label(&bare_label) {
                    if inline_engine.is_some() {
                        current = inline_engine;
                    }
                    let target = match current {
                        Some(EngineKind::DeepL) => &mut scores.deepl,
                        Some(EngineKind::DeepSeek) => &mut scores.deepseek,
                        None => continue,
                    };
                    if let Some(number) = leading_number(value) {
                        dimension.set(target, number);
                        scores.parsed_fields += 1;
                    }
                    continue;
                }
            }

            // Section headers such as "DeepL scores:" or "**DeepSeek**"
            if let Some(engine) = engine_named_in(&lowered) {
                current = Some(engine);
            }
        }

        scores.deepl.recompute_overall();
        scores.deepseek.recompute_overall();
        scores
    }

    fn neutral() -> Self {
        Self {
            deepl: EngineQuality::default(),
            deepseek: EngineQuality::default(),
            parsed_fields: 0,
        }
    }

    pub fn for_engine(&self, engine: EngineKind) -> &EngineQuality {
        match engine {
            EngineKind::DeepL => &self.deepl,
            EngineKind::DeepSeek => &self.deepseek,
        }
    }
}

/// The chosen translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub method: SelectionMethod,
    pub confidence: f32,
}

/// Candidate translations, one per engine
#[derive(Debug, Clone, Copy, Default)]
pub struct Candidates<'a> {
    pub deepl: Option<&'a str>,
    pub deepseek: Option<&'a str>,
}

impl<'a> Candidates<'a> {
    pub fn new(deepl: Option<&'a str>, deepseek: Option<&'a str>) -> Self {
        let non_empty = |s: Option<&'a str>| s.filter(|t| !t.trim().is_empty());
        Self {
            deepl: non_empty(deepl),
            deepseek: non_empty(deepseek),
        }
    }

    /// Both engines produced a non-empty candidate
    pub fn both(&self) -> Option<(&'a str, &'a str)> {
        match (self.deepl, self.deepseek) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

/// Picks the better of two candidate translations
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineSelector;

impl EngineSelector {
    pub fn new() -> Self {
        Self
    }

    /// Select when fewer than two candidates exist; `None` means both are present
    pub fn select_single(&self, candidates: &Candidates<'_>) -> Option<Selection> {
        match (candidates.deepl, candidates.deepseek) {
            (Some(text), None) => Some(Selection {
                text: text.to_string(),
                method: SelectionMethod::DeeplOnly,
                confidence: 0.8,
            }),
            (None, Some(text)) => Some(Selection {
                text: text.to_string(),
                method: SelectionMethod::DeepseekOnly,
                confidence: 0.8,
            }),
            (None, None) => Some(Selection {
                text: String::new(),
                method: SelectionMethod::Failed,
                confidence: 0.0,
            }),
            (Some(_), Some(_)) => None,
        }
    }

    /// Full selection using quality scores and text features
    pub fn select(
        &self,
        candidates: &Candidates<'_>,
        features: &TextFeatures,
        scores: &QualityScores,
    ) -> Selection {
        if let Some(selection) = self.select_single(candidates) {
            return selection;
        }
        let Some((deepl, deepseek)) = candidates.both() else {
            return Selection {
                text: String::new(),
                method: SelectionMethod::Failed,
                confidence: 0.0,
            };
        };

        let pick = |text: &str, method: SelectionMethod, confidence: f32| Selection {
            text: text.to_string(),
            method,
            confidence: confidence.clamp(0.0, 1.0),
        };

        let deepl_score = scores.deepl.overall;
        let deepseek_score = scores.deepseek.overall;

        if (deepl_score - deepseek_score).abs() > DECISIVE_SCORE_GAP {
            return if deepl_score > deepseek_score {
                pick(deepl, SelectionMethod::DeeplSelected, deepl_score)
            } else {
                pick(deepseek, SelectionMethod::DeepseekSelected, deepseek_score)
            };
        }

        if features.mixed_language {
            pick(deepseek, SelectionMethod::DeepseekMixedLanguage, 0.9)
        } else if features.cultural_elements || features.idioms {
            pick(deepseek, SelectionMethod::DeepseekCultural, 0.9)
        } else if features.technical_terms {
            pick(deepl, SelectionMethod::DeeplTechnical, 0.9)
        } else if features.is_formal() {
            pick(deepl, SelectionMethod::DeeplFormal, 0.9)
        } else if deepl_score >= deepseek_score {
            pick(deepl, SelectionMethod::DeeplDefault, deepl_score)
        } else {
            pick(deepseek, SelectionMethod::DeepseekDefault, deepseek_score)
        }
    }

    /// Length-based fallback when the assessment could not be interpreted
    pub fn select_by_length(&self, original: &str, candidates: &Candidates<'_>) -> Selection {
        if let Some(selection) = self.select_single(candidates) {
            return selection;
        }
        let (deepl, deepseek) = candidates.both().unwrap_or_default();
        if original.chars().count() < SHORT_TEXT_CHARS {
            Selection {
                text: deepl.to_string(),
                method: SelectionMethod::DeeplShortText,
                confidence: 0.7,
            }
        } else {
            Selection {
                text: deepseek.to_string(),
                method: SelectionMethod::DeepseekLongText,
                confidence: 0.7,
            }
        }
    }
}

// @returns: Engine mentioned in a lowercase line, DeepSeek first since its name is longer
fn engine_named_in(lowered: &str) -> Option<EngineKind> {
    if lowered.contains("deepseek") {
        Some(EngineKind::DeepSeek)
    } else if lowered.contains("deepl") {
        Some(EngineKind::DeepL)
    } else {
        None
    }
}

// @returns: First number in a score value such as "0.85, good" or "0.9/1"
fn leading_number(value: &str) -> Option<f32> {
    let value = value.trim();
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse::<f32>().ok()
}
