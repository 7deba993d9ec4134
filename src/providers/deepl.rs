use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils::SupportedLanguage;
use crate::providers::{
    status_error, transport_error, EngineKind, EngineTranslation, RetryPolicy, TranslationEngine,
    TranslationRequest,
};

/// Endpoint for keys on the free plan (suffix `:fx`)
pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2";
/// Endpoint for paid keys
pub const DEEPL_PRO_ENDPOINT: &str = "https://api.deepl.com/v2";

/// DeepL client for the `/translate` endpoint
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL without a trailing slash
    endpoint: String,
    retry: RetryPolicy,
}

/// Response of `/translate`
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

/// One translated text
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

impl DeepL {
    /// Create a new DeepL client
    ///
    /// An empty `endpoint` selects the free or paid API from the key suffix.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64, retry: RetryPolicy) -> Self {
        let api_key = api_key.into();
        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            Self::default_endpoint(&api_key).to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key,
            endpoint,
            retry,
        }
    }

    /// Free-plan keys end with `:fx`
    pub fn default_endpoint(api_key: &str) -> &'static str {
        if api_key.ends_with(":fx") {
            DEEPL_FREE_ENDPOINT
        } else {
            DEEPL_PRO_ENDPOINT
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn language_codes(
        source: SupportedLanguage,
        target: SupportedLanguage,
    ) -> Result<(&'static str, &'static str), ProviderError> {
        let unsupported = |language: SupportedLanguage| ProviderError::UnsupportedLanguage {
            engine: EngineKind::DeepL.to_string(),
            language: language.to_string(),
        };
        let source_code = source.deepl_source_code().ok_or_else(|| unsupported(source))?;
        let target_code = target.deepl_target_code().ok_or_else(|| unsupported(target))?;
        Ok((source_code, target_code))
    }

    async fn send_translate(&self, form: &[(&str, &str)]) -> Result<DeepLResponse, ProviderError> {
        let url = format!("{}/translate", self.endpoint);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(form)
            .send()
            .await
            .map_err(|e| transport_error(EngineKind::DeepL, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(status_error(EngineKind::DeepL, status.as_u16(), error_text));
        }

        response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL API response: {}", e)))
    }
}

#[async_trait]
impl TranslationEngine for DeepL {
    fn kind(&self) -> EngineKind {
        EngineKind::DeepL
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<EngineTranslation, ProviderError> {
        let (source_code, target_code) = Self::language_codes(request.source, request.target)?;

        let mut form: Vec<(&str, &str)> = vec![
            ("text", request.text.as_str()),
            ("source_lang", source_code),
            ("target_lang", target_code),
        ];
        if let Some(context) = request.context.as_deref() {
            form.push(("context", context));
        }

        debug!(
            "DeepL translate {} -> {} ({} chars)",
            source_code,
            target_code,
            request.text.chars().count()
        );

        let response = self.retry.run("DeepL translate", || self.send_translate(&form)).await?;

        let translation = response
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("DeepL returned no translations".to_string()))?;

        Ok(EngineTranslation::text_only(translation.text.trim()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/usage", self.endpoint);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| transport_error(EngineKind::DeepL, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(status_error(EngineKind::DeepL, status.as_u16(), error_text))
        }
    }
}
