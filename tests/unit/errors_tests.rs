/*!
 * Tests for error types
 */

use backtrans::errors::{AppError, ProviderError, TranslationError};

#[test]
fn test_providerError_isRetryable_shouldRetryTransientFailures() {
    assert!(ProviderError::ConnectionError("reset".into()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".into()).is_retryable());
    assert!(ProviderError::ApiError { status_code: 503, message: "busy".into() }.is_retryable());

    assert!(!ProviderError::ApiError { status_code: 400, message: "bad".into() }.is_retryable());
    assert!(!ProviderError::AuthenticationError("401".into()).is_retryable());
    assert!(!ProviderError::QuotaExceeded("456".into()).is_retryable());
    assert!(!ProviderError::UnsupportedLanguage { engine: "DeepL".into(), language: "Lao".into() }.is_retryable());
}

#[test]
fn test_providerError_display_shouldDescribeError() {
    let error = ProviderError::UnsupportedLanguage {
        engine: "DeepL".into(),
        language: "Khmer".into(),
    };
    assert_eq!(error.to_string(), "Unsupported language for DeepL: Khmer");

    let error = ProviderError::ApiError { status_code: 500, message: "oops".into() };
    assert_eq!(error.to_string(), "API responded with error: 500 - oops");
}

#[test]
fn test_translationError_fromProviderError_shouldWrap() {
    let error: TranslationError = ProviderError::ParseError("bad json".into()).into();
    assert!(matches!(error, TranslationError::Provider(_)));
    assert!(error.to_string().contains("bad json"));

    let chunk = TranslationError::Chunk { index: 2, message: "All engines failed".into() };
    assert_eq!(chunk.to_string(), "Chunk 2 failed: All engines failed");
}

#[test]
fn test_appError_conversions_shouldMapSources() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let any = anyhow::anyhow!("something");
    assert!(matches!(AppError::from(any), AppError::Unknown(_)));

    let translation = TranslationError::InvalidInput("empty".into());
    let app: AppError = translation.into();
    assert_eq!(app.to_string(), "Translation error: Invalid input: empty");
}
