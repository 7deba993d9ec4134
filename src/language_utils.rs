use anyhow::{Result, anyhow};
use isolang::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language utilities
///
/// This module provides the set of languages the analyzer works with, plus
/// functions for validating, normalizing and matching ISO 639-1 (2-letter)
/// and ISO 639-2 (3-letter) language codes.

/// Languages supported by the round-trip analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    Chinese,
    English,
    Vietnamese,
    Malay,
    Thai,
    Indonesian,
    Filipino,
    Burmese,
    Lao,
    Khmer,
}

impl SupportedLanguage {
    /// Every supported language, in menu order
    pub const ALL: [SupportedLanguage; 10] = [
        Self::Chinese,
        Self::English,
        Self::Vietnamese,
        Self::Malay,
        Self::Thai,
        Self::Indonesian,
        Self::Filipino,
        Self::Burmese,
        Self::Lao,
        Self::Khmer,
    ];

    // @returns: English display name, also used inside prompts
    pub fn english_name(&self) -> &'static str {
        match self {
            Self::Chinese => "Chinese",
            Self::English => "English",
            Self::Vietnamese => "Vietnamese",
            Self::Malay => "Malay",
            Self::Thai => "Thai",
            Self::Indonesian => "Indonesian",
            Self::Filipino => "Filipino",
            Self::Burmese => "Burmese",
            Self::Lao => "Lao",
            Self::Khmer => "Khmer",
        }
    }

    // @returns: Native label
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::Chinese => "中文",
            Self::English => "English",
            Self::Vietnamese => "Tiếng Việt",
            Self::Malay => "Bahasa Melayu",
            Self::Thai => "ภาษาไทย",
            Self::Indonesian => "Bahasa Indonesia",
            Self::Filipino => "Filipino",
            Self::Burmese => "မြန်မာဘာသာ",
            Self::Lao => "ພາສາລາວ",
            Self::Khmer => "ភាសាខ្មែរ",
        }
    }

    // @returns: ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Chinese => "zh",
            Self::English => "en",
            Self::Vietnamese => "vi",
            Self::Malay => "ms",
            Self::Thai => "th",
            Self::Indonesian => "id",
            Self::Filipino => "tl",
            Self::Burmese => "my",
            Self::Lao => "lo",
            Self::Khmer => "km",
        }
    }

    /// DeepL code when the language is used as a source
    pub fn deepl_source_code(&self) -> Option<&'static str> {
        match self {
            Self::Chinese => Some("ZH"),
            Self::English => Some("EN"),
            Self::Vietnamese => Some("VI"),
            Self::Malay => Some("MS"),
            Self::Thai => Some("TH"),
            Self::Indonesian => Some("ID"),
            Self::Filipino => Some("TL"),
            Self::Burmese | Self::Lao | Self::Khmer => None,
        }
    }

    /// DeepL code when the language is used as a target
    ///
    /// DeepL rejects the bare `EN` target and wants a regional variant.
    pub fn deepl_target_code(&self) -> Option<&'static str> {
        match self {
            Self::English => Some("EN-US"),
            other => other.deepl_source_code(),
        }
    }

    /// Whether DeepL can translate into and out of this language
    pub fn deepl_supported(&self) -> bool {
        self.deepl_source_code().is_some()
    }

    /// Whether the language is written with CJK ideographs
    pub fn is_cjk(&self) -> bool {
        matches!(self, Self::Chinese)
    }

    fn from_part2t(code: &str) -> Option<Self> {
        match code {
            "zho" | "cmn" => Some(Self::Chinese),
            "eng" => Some(Self::English),
            "vie" => Some(Self::Vietnamese),
            "msa" | "zsm" => Some(Self::Malay),
            "tha" => Some(Self::Thai),
            "ind" => Some(Self::Indonesian),
            "tgl" | "fil" => Some(Self::Filipino),
            "mya" => Some(Self::Burmese),
            "lao" => Some(Self::Lao),
            "khm" => Some(Self::Khmer),
            _ => None,
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.english_name())
    }
}

impl FromStr for SupportedLanguage {
    type Err = anyhow::Error;

    /// Accepts English names, Chinese labels and ISO 639 codes
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let lowered = trimmed.to_lowercase();

        if let Some(lang) = Self::ALL.iter().find(|l| l.english_name().to_lowercase() == lowered) {
            return Ok(*lang);
        }

        let by_label = match trimmed {
            "中文" | "汉语" | "简体中文" => Some(Self::Chinese),
            "英语" | "英文" => Some(Self::English),
            "越南语" => Some(Self::Vietnamese),
            "马来语" => Some(Self::Malay),
            "泰语" => Some(Self::Thai),
            "印尼语" | "印度尼西亚语" => Some(Self::Indonesian),
            "菲律宾语" | "他加禄语" => Some(Self::Filipino),
            "缅甸语" => Some(Self::Burmese),
            "老挝语" => Some(Self::Lao),
            "柬埔寨语" | "高棉语" => Some(Self::Khmer),
            _ => None,
        };
        if let Some(lang) = by_label {
            return Ok(lang);
        }

        match lowered.as_str() {
            "cmn" | "zh-cn" | "zh-hans" => return Ok(Self::Chinese),
            "zsm" => return Ok(Self::Malay),
            "fil" => return Ok(Self::Filipino),
            "en-us" | "en-gb" => return Ok(Self::English),
            _ => {}
        }

        normalize_to_part2t(&lowered)
            .ok()
            .and_then(|code| Self::from_part2t(&code))
            .ok_or_else(|| anyhow!("Unsupported language: {}", s))
    }
}

/// Language code type
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// @returns: ISO 639-2/T equivalent of a bibliographic code, if it is one
fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    match code {
        "chi" => Some("zho"),
        "bur" => Some("mya"),
        "may" => Some("msa"),
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "cze" => Some("ces"),
        "per" => Some("fas"),
        "rum" => Some("ron"),
        _ => None,
    }
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if Language::from_639_1(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
