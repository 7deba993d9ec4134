/*!
 * Tests for the DeepL and DeepSeek clients against a local mock server
 */

use mockito::{Matcher, Server};

use backtrans::errors::ProviderError;
use backtrans::language_utils::SupportedLanguage;
use backtrans::providers::deepl::{DeepL, DEEPL_FREE_ENDPOINT, DEEPL_PRO_ENDPOINT};
use backtrans::providers::deepseek::DeepSeek;
use backtrans::providers::{CompletionProvider, RetryPolicy, TranslationEngine, TranslationRequest};

fn no_delay(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, 0)
}

const CHAT_REPLY: &str = r#"{
    "choices": [{"message": {"role": "assistant", "content": "  The weather is nice today.  "}}],
    "usage": {"prompt_tokens": 42, "completion_tokens": 7}
}"#;

#[test]
fn test_deepl_defaultEndpoint_shouldFollowKeySuffix() {
    assert_eq!(DeepL::default_endpoint("abc:fx"), DEEPL_FREE_ENDPOINT);
    assert_eq!(DeepL::default_endpoint("abc"), DEEPL_PRO_ENDPOINT);

    let client = DeepL::new("abc:fx", "", 30, no_delay(0));
    assert_eq!(client.endpoint(), DEEPL_FREE_ENDPOINT);
    let client = DeepL::new("abc", "http://localhost:1234/v2/", 30, no_delay(0));
    assert_eq!(client.endpoint(), "http://localhost:1234/v2");
}

#[tokio::test]
async fn test_deepl_translate_withMockServer_shouldSendFormAndTrim() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/translate")
        .match_header("authorization", "DeepL-Auth-Key test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("source_lang".into(), "ZH".into()),
            Matcher::UrlEncoded("target_lang".into(), "EN-US".into()),
            Matcher::UrlEncoded("context".into(), "上一句".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"translations": [{"detected_source_language": "ZH", "text": " Hello "}]}"#)
        .create_async()
        .await;

    let client = DeepL::new("test-key", server.url(), 30, no_delay(0));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::English)
        .with_context(Some("上一句".to_string()));

    let translation = client.translate(&request).await.unwrap();

    assert_eq!(translation.text, "Hello");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepl_translate_withUnsupportedTarget_shouldFailWithoutRequest() {
    let mut server = Server::new_async().await;
    let mock = server.mock("POST", "/translate").expect(0).create_async().await;

    let client = DeepL::new("test-key", server.url(), 30, no_delay(0));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::Lao);

    let err = client.translate(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::UnsupportedLanguage { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepl_translate_withServerError_shouldRetry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/translate")
        .with_status(503)
        .with_body("unavailable")
        .expect(3)
        .create_async()
        .await;

    let client = DeepL::new("test-key", server.url(), 30, no_delay(2));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::Thai);

    let err = client.translate(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::ApiError { status_code: 503, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepl_translate_withQuotaExceeded_shouldNotRetry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/translate")
        .with_status(456)
        .with_body("Quota exceeded")
        .expect(1)
        .create_async()
        .await;

    let client = DeepL::new("test-key", server.url(), 30, no_delay(3));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::Thai);

    let err = client.translate(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::QuotaExceeded(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepl_testConnection_shouldQueryUsage() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("GET", "/usage")
        .with_status(200)
        .with_body(r#"{"character_count": 10, "character_limit": 500000}"#)
        .create_async()
        .await;

    let client = DeepL::new("test-key", server.url(), 30, no_delay(0));
    assert!(client.test_connection().await.is_ok());
    ok.assert_async().await;
}

#[tokio::test]
async fn test_deepl_testConnection_withBadKey_shouldReturnAuthError() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/usage").with_status(403).create_async().await;

    let client = DeepL::new("wrong", server.url(), 30, no_delay(0));
    let err = client.test_connection().await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthenticationError(_)));
}

#[tokio::test]
async fn test_deepseek_translate_withMockServer_shouldReturnTextAndUsage() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJsonString(
            r#"{"model": "deepseek-chat", "max_tokens": 2000}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CHAT_REPLY)
        .create_async()
        .await;

    let client = DeepSeek::new("sk-test", server.url(), 60, no_delay(0));
    let request = TranslationRequest::new("今天天气很好", SupportedLanguage::Chinese, SupportedLanguage::English);

    let translation = client.translate(&request).await.unwrap();

    assert_eq!(translation.text, "The weather is nice today.");
    assert_eq!(translation.prompt_tokens, Some(42));
    assert_eq!(translation.completion_tokens, Some(7));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepseek_translate_withEmptyReply_shouldReturnParseError() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#)
        .create_async()
        .await;

    let client = DeepSeek::new("sk-test", server.url(), 60, no_delay(0));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::English);

    let err = client.translate(&request).await.unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn test_deepseek_translate_withRateLimit_shouldRetryUntilExhausted() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("too many requests")
        .expect(3)
        .create_async()
        .await;

    let client = DeepSeek::new("sk-test", server.url(), 60, no_delay(2));
    let request = TranslationRequest::new("你好", SupportedLanguage::Chinese, SupportedLanguage::English);

    let err = client.translate(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::RateLimitExceeded(_)));
    limited.assert_async().await;
}

#[tokio::test]
async fn test_deepseek_complete_shouldSendSystemAndUserMessages() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJsonString(
            r#"{"messages": [{"role": "system", "content": "judge"}, {"role": "user", "content": "compare"}]}"#
                .to_string(),
        ))
        .with_status(200)
        .with_body(CHAT_REPLY)
        .create_async()
        .await;

    let client = DeepSeek::new("sk-test", server.url(), 60, no_delay(0));
    let reply = client.complete("judge", "compare").await.unwrap();

    assert_eq!(reply, "The weather is nice today.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_deepseek_testConnection_withUnauthorized_shouldReturnAuthError() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body("invalid key")
        .expect(1)
        .create_async()
        .await;

    let client = DeepSeek::new("bad", server.url(), 60, no_delay(3));
    let err = client.test_connection().await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthenticationError(_)));
}
