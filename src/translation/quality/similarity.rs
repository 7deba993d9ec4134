/*!
 * Threshold-based text similarity.
 *
 * Character-set Jaccard scoring, consistency levels and the dynamic
 * threshold used to decide whether a back-translation still carries the
 * meaning of the original text.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default similarity threshold
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Character-overlap similarity of two texts in `[0.0, 1.0]`
///
/// Identical strings score 1.0. Otherwise the score is the Jaccard index of
/// the lowercase character sets.
pub fn char_jaccard(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }

    let set_a: HashSet<char> = a.to_lowercase().chars().collect();
    let set_b: HashSet<char> = b.to_lowercase().chars().collect();

    match (set_a.is_empty(), set_b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        _ => {
            let intersection = set_a.intersection(&set_b).count();
            let union = set_a.union(&set_b).count();
            if union == 0 {
                0.0
            } else {
                intersection as f32 / union as f32
            }
        }
    }
}

/// Consistency grade derived from a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    /// Texts are byte-for-byte equal
    Identical,
    NearlyIdentical,
    High,
    Basic,
    Partial,
    Low,
    Inconsistent,
}

impl ConsistencyLevel {
    /// Grade a score
    pub fn from_score(score: f32) -> Self {
        if score >= 0.95 {
            Self::NearlyIdentical
        } else if score >= 0.9 {
            Self::High
        } else if score >= 0.8 {
            Self::Basic
        } else if score >= 0.7 {
            Self::Partial
        } else if score >= 0.5 {
            Self::Low
        } else {
            Self::Inconsistent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::NearlyIdentical => "nearly identical",
            Self::High => "highly consistent",
            Self::Basic => "mostly consistent",
            Self::Partial => "partially consistent",
            Self::Low => "weakly consistent",
            Self::Inconsistent => "inconsistent",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Meaning judgement returned by the semantic analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SemanticVerdict {
    Identical,
    Similar,
    Different,
    #[default]
    Unknown,
}

impl SemanticVerdict {
    /// Parse a verdict word, case-insensitively; anything unrecognised is `Unknown`
    pub fn parse(value: &str) -> Self {
        match value.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase().as_str() {
            "identical" => Self::Identical,
            "similar" => Self::Similar,
            "different" => Self::Different,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::Similar => "similar",
            Self::Different => "different",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SemanticVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Chooses the pass threshold for a pair of texts
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    /// Threshold used when no other rule applies
    pub base_threshold: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            base_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl ThresholdPolicy {
    pub fn new(base_threshold: f32) -> Self {
        Self {
            base_threshold: base_threshold.clamp(0.0, 1.0),
        }
    }

    /// Dynamic threshold for the given texts and verdict
    pub fn threshold_for(&self, a: &str, b: &str, verdict: SemanticVerdict) -> f32 {
        match verdict {
            SemanticVerdict::Identical => return 0.5,
            SemanticVerdict::Similar => return 0.6,
            _ => {}
        }

        // Very short texts have too few characters to score reliably
        if a.chars().count() <= 3 || b.chars().count() <= 3 {
            return 0.6;
        }

        self.base_threshold
    }

    /// Whether a score passes a threshold
    pub fn passes(score: f32, threshold: f32) -> bool {
        score >= threshold
    }
}
