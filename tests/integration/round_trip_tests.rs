/*!
 * End-to-end round-trip analysis with scripted engines
 */

use std::sync::Arc;

use backtrans::errors::TranslationError;
use backtrans::language_utils::SupportedLanguage;
use backtrans::providers::mock::{MockCompletion, MockEngine};
use backtrans::providers::{CompletionProvider, EngineKind, TranslationEngine};
use backtrans::translation::quality::{AnalysisMethod, SelectionMethod, SemanticAnalyzer, ThresholdPolicy};
use backtrans::translation::{DualEngineTranslator, RoundTripAnalyzer, TextChunker};

use crate::common::{as_engine, working_engines};

fn heuristic() -> SemanticAnalyzer {
    SemanticAnalyzer::heuristic(ThresholdPolicy::default())
}

#[tokio::test]
async fn test_roundTrip_mixedLanguageText_shouldPreferDeepseek() {
    let (deepl, deepseek) = working_engines();
    let translator = DualEngineTranslator::new(as_engine(&deepl), as_engine(&deepseek)).unwrap();
    let analyzer = RoundTripAnalyzer::new(translator, heuristic(), TextChunker::default());

    let report = analyzer
        .run("我喜欢看NBA比赛", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    assert_eq!(report.chunk_methods[0].method, SelectionMethod::DeepseekMixedLanguage);
    assert!(report.features.mixed_language);
    assert_eq!(report.back_translation, "我喜欢看NBA比赛");
    assert_eq!(deepl.request_count(), 2);
    assert_eq!(deepseek.request_count(), 2);
}

#[tokio::test]
async fn test_roundTrip_identicalBackTranslation_shouldSkipJudge() {
    let (deepl, deepseek) = working_engines();
    let translator = DualEngineTranslator::new(as_engine(&deepl), as_engine(&deepseek)).unwrap();
    let judge = Arc::new(MockCompletion::replying(r#"{"similarity_score": 0.1}"#));
    let analyzer = RoundTripAnalyzer::new(
        translator,
        SemanticAnalyzer::with_llm(judge.clone(), ThresholdPolicy::default()),
        TextChunker::default(),
    );

    let report = analyzer
        .run("一只猫", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    assert_eq!(report.consistency.method, AnalysisMethod::Exact);
    assert!(report.consistency.is_identical);
    assert_eq!(report.consistency.score, 1.0);
    assert_eq!(judge.call_count(), 0);
}

#[tokio::test]
async fn test_roundTrip_differentBackTranslation_shouldScoreWithJudge() {
    fn paraphrase(request: &backtrans::providers::TranslationRequest) -> String {
        match request.target {
            SupportedLanguage::Chinese => "一条猫".to_string(),
            _ => "a cat".to_string(),
        }
    }
    let engine: Arc<dyn TranslationEngine> =
        Arc::new(MockEngine::working(EngineKind::DeepSeek).with_custom_response(paraphrase));
    let judge = Arc::new(MockCompletion::replying(
        r#"{"similarity_score": 0.85, "semantic_meaning": "similar", "analysis": "measure word differs", "confidence": 0.9}"#,
    ));
    let translator = DualEngineTranslator::new(None, Some(engine)).unwrap();
    let analyzer = RoundTripAnalyzer::new(
        translator,
        SemanticAnalyzer::with_llm(judge.clone(), ThresholdPolicy::default()),
        TextChunker::default(),
    );

    let report = analyzer
        .run("一只猫", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    assert_eq!(report.target_translation, "a cat");
    assert_eq!(report.back_translation, "一条猫");
    assert_eq!(report.consistency.method, AnalysisMethod::Llm);
    assert!((report.consistency.score - 0.85).abs() < 1e-6);
    assert!(report.consistency.is_consistent);
    assert_eq!(report.consistency.threshold, 0.6);
    assert_eq!(judge.call_count(), 1);
    assert_eq!(report.engines, "DeepSeek");
}

#[tokio::test]
async fn test_roundTrip_llmScoring_shouldCountJudgeAndAssessorCalls() {
    fn paraphrase(request: &backtrans::providers::TranslationRequest) -> String {
        match request.target {
            SupportedLanguage::Chinese => "一条猫".to_string(),
            _ => "a cat".to_string(),
        }
    }
    let deepl: Arc<dyn TranslationEngine> =
        Arc::new(MockEngine::working(EngineKind::DeepL).with_custom_response(paraphrase));
    let deepseek: Arc<dyn TranslationEngine> =
        Arc::new(MockEngine::working(EngineKind::DeepSeek).with_custom_response(paraphrase));
    let assessor = Arc::new(MockCompletion::replying(
        r#"{"deepl": {"accuracy": 0.9}, "deepseek": {"accuracy": 0.8}}"#,
    ));
    let judge = Arc::new(MockCompletion::replying(r#"{"similarity_score": 0.85, "semantic_meaning": "similar"}"#));
    let translator = DualEngineTranslator::new(Some(deepl), Some(deepseek))
        .unwrap()
        .with_assessor(Some(assessor.clone() as Arc<dyn CompletionProvider>));
    let analyzer = RoundTripAnalyzer::new(
        translator,
        SemanticAnalyzer::with_llm(judge.clone(), ThresholdPolicy::default()),
        TextChunker::default(),
    );

    let report = analyzer
        .run("一只猫", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    assert_eq!(assessor.call_count(), 2);
    assert_eq!(judge.call_count(), 1);
    // Two translations plus two assessments plus one judgement
    assert_eq!(report.usage["DeepSeek"].requests, 5);
    assert_eq!(report.usage["DeepL"].requests, 2);
    assert!(report.usage["DeepSeek"].characters > report.usage["DeepL"].characters);
}

#[tokio::test]
async fn test_roundTrip_judgeFailure_shouldFallBackToCharacterOverlap() {
    fn paraphrase(request: &backtrans::providers::TranslationRequest) -> String {
        match request.target {
            SupportedLanguage::Chinese => "天气今天很好".to_string(),
            _ => "nice weather".to_string(),
        }
    }
    let engine: Arc<dyn TranslationEngine> =
        Arc::new(MockEngine::working(EngineKind::DeepL).with_custom_response(paraphrase));
    let translator = DualEngineTranslator::new(Some(engine), None).unwrap();
    let analyzer = RoundTripAnalyzer::new(
        translator,
        SemanticAnalyzer::with_llm(Arc::new(MockCompletion::failing()), ThresholdPolicy::default()),
        TextChunker::default(),
    );

    let report = analyzer
        .run("今天天气很好", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    assert_eq!(report.consistency.method, AnalysisMethod::Fallback);
    assert!(report.consistency.score > 0.9, "same characters in a different order");
}

#[tokio::test]
async fn test_roundTrip_longText_shouldAlternateEnginesPerChunk() {
    let (deepl, deepseek) = working_engines();
    let translator = DualEngineTranslator::new(as_engine(&deepl), as_engine(&deepseek)).unwrap();
    let analyzer = RoundTripAnalyzer::new(translator, heuristic(), TextChunker::new(20, 5)).with_concurrency(3);

    let text = "第一段讲的是天气。第二段讲的是交通。第三段讲的是美食。第四段讲的是旅行。";
    let report = analyzer
        .run(text, SupportedLanguage::Chinese, SupportedLanguage::Vietnamese)
        .await
        .unwrap();

    assert!(report.is_long_text);
    assert!(report.chunks_count >= 2);
    assert_eq!(report.back_translation, text);
    for record in &report.chunk_methods {
        let forward = record.method.engine().unwrap();
        assert_eq!(record.back_engine, Some(forward.opposite()));
    }

    // Every chunk after the first carries source context forward
    let forward_requests: Vec<_> = deepl
        .requests()
        .into_iter()
        .filter(|r| r.target == SupportedLanguage::Vietnamese)
        .collect();
    assert_eq!(forward_requests.len(), report.chunks_count);
    assert!(forward_requests.iter().skip(1).all(|r| r.context.is_some()));
}

#[tokio::test]
async fn test_roundTrip_slowFirstChunk_shouldKeepChunkOrder() {
    let deepl = Arc::new(MockEngine::slow_first(EngineKind::DeepL, 100));
    let translator = DualEngineTranslator::new(as_engine(&deepl), None).unwrap();
    let analyzer = RoundTripAnalyzer::new(translator, heuristic(), TextChunker::new(20, 5)).with_concurrency(2);

    let text = "第一段讲的是天气。第二段讲的是交通。第三段讲的是美食。第四段讲的是旅行。";
    let report = analyzer
        .run(text, SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap();

    // The delayed request belongs to the first chunk
    assert!(deepl.requests()[0].text.starts_with("第一段"));
    assert_eq!(report.chunks_count, 2);

    let first = report.target_translation.find("天气").unwrap();
    let second = report.target_translation.find("美食").unwrap();
    assert!(first < second);
    assert_eq!(report.back_translation, text);
}

#[tokio::test]
async fn test_roundTrip_allEnginesFailing_shouldReturnError() {
    let deepl: Arc<dyn TranslationEngine> = Arc::new(MockEngine::failing(EngineKind::DeepL));
    let deepseek: Arc<dyn TranslationEngine> = Arc::new(MockEngine::failing(EngineKind::DeepSeek));
    let translator = DualEngineTranslator::new(Some(deepl), Some(deepseek)).unwrap();
    let analyzer = RoundTripAnalyzer::new(translator, heuristic(), TextChunker::default());

    let err = analyzer
        .run("你好", SupportedLanguage::Chinese, SupportedLanguage::English)
        .await
        .unwrap_err();

    assert!(matches!(err, TranslationError::AllEnginesFailed(_)));
}
