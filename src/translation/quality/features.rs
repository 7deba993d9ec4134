/*!
 * Source-text features used by the engine-selection heuristic.
 *
 * The features are cheap lexical signals: length class, culture-specific
 * slang, technical vocabulary, politeness markers and whether the text mixes
 * Latin-script words into CJK text.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Length class of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

/// Register of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formality {
    Neutral,
    Formal,
}

/// Internet slang and idioms that literal engines tend to mistranslate
const CULTURAL_INDICATORS: &[&str] = &[
    "仨尖儿", "坐11路", "打酱油", "吃瓜", "躺平", "内卷", "凡尔赛", "yyds", "绝绝子", "破防",
];

/// ASCII technical terms, matched as whole words
const TECHNICAL_TERMS_ASCII: &[&str] = &[
    "API", "HTTP", "JSON", "XML", "CPU", "GPU", "AI", "ML", "NLP",
];

/// CJK technical terms, matched as substrings
const TECHNICAL_TERMS_CJK: &[&str] = &["数据库", "算法", "编程", "代码"];

const FORMAL_INDICATORS: &[&str] = &["请", "您", "敬", "谨", "此致", "敬礼"];

/// Known abbreviations and brand names with their expansions
const GLOSSARY: &[(&str, &str)] = &[
    ("NBA", "National Basketball Association"),
    ("CBA", "Chinese Basketball Association"),
    ("CPU", "central processing unit"),
    ("GPU", "graphics processing unit"),
    ("API", "application programming interface"),
    ("HTTP", "Hypertext Transfer Protocol"),
    ("URL", "uniform resource locator"),
    ("HTML", "Hypertext Markup Language"),
    ("CSS", "Cascading Style Sheets"),
    ("JavaScript", "JavaScript programming language"),
    ("Python", "Python programming language"),
    ("Java", "Java programming language"),
    ("AI", "artificial intelligence"),
    ("ML", "machine learning"),
    ("DL", "deep learning"),
    ("NLP", "natural language processing"),
    ("CV", "computer vision"),
    ("IoT", "Internet of Things"),
    ("VR", "virtual reality"),
    ("AR", "augmented reality"),
    ("WiFi", "wireless network"),
    ("Bluetooth", "Bluetooth"),
    ("USB", "Universal Serial Bus"),
    ("HDMI", "High-Definition Multimedia Interface"),
    ("SSD", "solid-state drive"),
    ("RAM", "random-access memory"),
    ("ROM", "read-only memory"),
    ("OS", "operating system"),
    ("UI", "user interface"),
    ("UX", "user experience"),
    ("SEO", "search engine optimization"),
    ("SEM", "search engine marketing"),
    ("CRM", "customer relationship management"),
    ("ERP", "enterprise resource planning"),
    ("SaaS", "software as a service"),
];

static LATIN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+]*").unwrap());

static CJK_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{3400}-\u{4DBF}\u{4E00}-\u{9FFF}\u{20000}-\u{2A6DF}]+").unwrap()
});

// ASCII boundaries so terms embedded in CJK text still match
static ASCII_TECH_TERM: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?:^|[^A-Za-z0-9])(?:{})(?:[^A-Za-z0-9]|$)",
        TECHNICAL_TERMS_ASCII.join("|")
    );
    Regex::new(&pattern).unwrap()
});

/// Lexical features of a source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    /// Length in characters
    pub length: usize,
    pub complexity: Complexity,
    pub cultural_elements: bool,
    pub idioms: bool,
    pub technical_terms: bool,
    pub formality: Formality,
    pub mixed_language: bool,
    /// Latin-script words in order of first appearance
    pub english_words: Vec<String>,
    /// CJK runs in order of first appearance
    pub chinese_words: Vec<String>,
}

impl TextFeatures {
    /// Analyze a text
    pub fn analyze(text: &str) -> Self {
        let length = text.chars().count();
        let complexity = if length > 200 {
            Complexity::Complex
        } else if length > 50 {
            Complexity::Medium
        } else {
            Complexity::Simple
        };

        let cultural = CULTURAL_INDICATORS.iter().any(|ind| text.contains(ind));

        let technical = ASCII_TECH_TERM.is_match(text)
            || TECHNICAL_TERMS_CJK.iter().any(|term| text.contains(term));

        let formality = if FORMAL_INDICATORS.iter().any(|ind| text.contains(ind)) {
            Formality::Formal
        } else {
            Formality::Neutral
        };

        let english_words = unique_matches(&LATIN_WORD, text);
        let chinese_words = unique_matches(&CJK_RUN, text);
        let mixed_language = !english_words.is_empty() && !chinese_words.is_empty();

        Self {
            length,
            complexity,
            cultural_elements: cultural,
            idioms: cultural,
            technical_terms: technical,
            formality,
            mixed_language,
            english_words,
            chinese_words,
        }
    }

    pub fn is_formal(&self) -> bool {
        self.formality == Formality::Formal
    }

    /// Short human-readable summary, used in prompts and logs
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("length {}", self.length)];
        parts.push(format!("{:?}", self.complexity).to_lowercase());
        if self.mixed_language {
            parts.push("mixed language".to_string());
        }
        if self.cultural_elements {
            parts.push("cultural expressions".to_string());
        }
        if self.technical_terms {
            parts.push("technical terms".to_string());
        }
        if self.is_formal() {
            parts.push("formal register".to_string());
        }
        parts.join(", ")
    }
}

fn unique_matches(re: &Regex, text: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        let word = m.as_str();
        if !seen.iter().any(|w| w == word) {
            seen.push(word.to_string());
        }
    }
    seen
}

/// Expansion hints for known abbreviations among the Latin-script words
pub fn glossary_hints(features: &TextFeatures) -> Vec<String> {
    features
        .english_words
        .iter()
        .filter_map(|word| {
            GLOSSARY
                .iter()
                .find(|(term, _)| *term == word.as_str())
                .map(|(term, expansion)| format!("'{}' means: {}", term, expansion))
        })
        .collect()
}
