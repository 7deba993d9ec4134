/*!
 * Prompt templates for translation and LLM scoring.
 */

use crate::providers::TranslationRequest;
use crate::translation::quality::features::{glossary_hints, TextFeatures};

/// A prompt template with `{source_language}` / `{target_language}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// System prompt for plain translation.
    pub const TRANSLATOR: &'static str = "You are a professional translator. Translate {source_language} text into {target_language}. Return only the translation.";

    /// System prompt for the enhanced, culture-aware translation.
    pub const CULTURAL_TRANSLATOR: &'static str = r#"You are a professional {source_language} to {target_language} translator with deep knowledge of both cultures.

## Analysis
- Identify culture-specific expressions, idioms and internet slang before translating
- Render each by meaning, not word for word
- Keep proper nouns, brand names and abbreviations as they are

## Principles
1. Keep the tone and emotion of the original
2. Produce fluent, natural {target_language}
3. Adapt cultural expressions so a native reader understands them
4. Output only the translation, with no notes or explanations"#;

    /// System prompt for round-trip similarity judgements.
    pub const SEMANTIC_JUDGE: &'static str = "You compare two texts written in the same language and judge whether they mean the same thing. Answer with JSON only.";

    /// System prompt for comparing two candidate translations.
    pub const QUALITY_JUDGE: &'static str = "You are a translation quality reviewer. Score candidate translations strictly and answer with JSON only.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn translator() -> Self {
        Self::new(Self::TRANSLATOR)
    }

    pub fn cultural_translator() -> Self {
        Self::new(Self::CULTURAL_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::cultural_translator()
    }
}

/// Builder for translation prompts.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    text: String,
    enhanced: bool,
    context: Option<String>,
    features: Option<TextFeatures>,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(source_language: &str, target_language: &str, text: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            text: text.to_string(),
            enhanced: true,
            context: None,
            features: None,
        }
    }

    /// Toggle the culture and mixed-language aware prompt.
    pub fn enhanced(mut self, enhanced: bool) -> Self {
        self.enhanced = enhanced;
        self
    }

    /// Preceding text, shown as reference only.
    pub fn with_context(mut self, context: Option<&str>) -> Self {
        self.context = context.map(str::to_string);
        self
    }

    /// Features of the text to translate; computed on build when absent.
    pub fn with_features(mut self, features: TextFeatures) -> Self {
        self.features = Some(features);
        self
    }

    pub fn build_system_prompt(&self) -> String {
        let template = if self.enhanced {
            PromptTemplate::cultural_translator()
        } else {
            PromptTemplate::translator()
        };
        template.render(&self.source_language, &self.target_language)
    }

    pub fn build_user_prompt(&self) -> String {
        let mut prompt = format!(
            "Translate the following {} text into {}.\n",
            self.source_language, self.target_language
        );

        if self.enhanced {
            let features = self
                .features
                .clone()
                .unwrap_or_else(|| TextFeatures::analyze(&self.text));

            if features.mixed_language {
                prompt.push_str("\nThe text mixes languages. Handle it as follows:\n");
                prompt.push_str("1. Keep English proper nouns, abbreviations and brand names untranslated\n");
                prompt.push_str("2. Keep the translation natural for the target language\n");
                prompt.push_str("3. Use the standard target-language rendering for technical terms\n");
                prompt.push_str(&format!("English words found: {}\n", features.english_words.join(", ")));
            }

            let hints = glossary_hints(&features);
            if !hints.is_empty() {
                prompt.push_str("\nGlossary:\n");
                for hint in hints {
                    prompt.push_str(&format!("- {}\n", hint));
                }
            }
        }

        if let Some(context) = &self.context {
            prompt.push_str("\nPreceding context (for reference only, do not translate it):\n");
            prompt.push_str(context);
            prompt.push('\n');
        }

        prompt.push_str("\nText:\n");
        prompt.push_str(&self.text);
        prompt
    }

    /// Build both system and user prompts.
    pub fn build(&self) -> (String, String) {
        (self.build_system_prompt(), self.build_user_prompt())
    }
}

/// System and user prompt for an engine translation request
pub fn translation_prompt(request: &TranslationRequest, enhanced: bool) -> (String, String) {
    TranslationPromptBuilder::new(
        request.source.english_name(),
        request.target.english_name(),
        &request.text,
    )
    .enhanced(enhanced)
    .with_context(request.context.as_deref())
    .build()
}

/// System and user prompt asking whether a back-translation kept the meaning
pub fn semantic_analysis_prompt(original: &str, back_translated: &str, language: &str) -> (String, String) {
    let user = format!(
        r#"Analyze the semantic similarity of these two {language} texts.

Text 1: "{original}"
Text 2: "{back_translated}"

Judge whether they express the same meaning. Ignore:
- measure word differences
- punctuation differences
- slight changes in word order
- synonym substitution
- differences in phrasing

Respond with JSON:
{{
    "similarity_score": 0.0-1.0,
    "semantic_meaning": "identical|similar|different",
    "analysis": "why this score was given",
    "confidence": 0.0-1.0
}}"#,
        language = language,
        original = original,
        back_translated = back_translated,
    );
    (PromptTemplate::SEMANTIC_JUDGE.to_string(), user)
}

/// System and user prompt asking to score the DeepL and DeepSeek candidates
pub fn quality_assessment_prompt(
    original: &str,
    deepl: &str,
    deepseek: &str,
    source_language: &str,
    target_language: &str,
    features: &TextFeatures,
) -> (String, String) {
    let user = format!(
        r#"Assess these two translations.

Original ({source_language}): {original}

DeepL translation ({target_language}): {deepl}
DeepSeek translation ({target_language}): {deepseek}

Text features: {features}

Score each translation from 0.0 to 1.0 on:
1. accuracy - conveys the original meaning
2. fluency - reads naturally
3. cultural_adaptation - fits the target culture
4. completeness - nothing is missing

Respond with JSON:
{{
    "deepl": {{"accuracy": 0.0, "fluency": 0.0, "cultural_adaptation": 0.0, "completeness": 0.0}},
    "deepseek": {{"accuracy": 0.0, "fluency": 0.0, "cultural_adaptation": 0.0, "completeness": 0.0}},
    "recommended": "deepl|deepseek",
    "reason": "short explanation"
}}"#,
        source_language = source_language,
        target_language = target_language,
        original = original,
        deepl = deepl,
        deepseek = deepseek,
        features = features.describe(),
    );
    (PromptTemplate::QUALITY_JUDGE.to_string(), user)
}
