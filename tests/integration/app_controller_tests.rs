/*!
 * Controller tests: wiring from configuration to a finished report
 */

use mockito::Server;
use std::sync::Arc;

use backtrans::app_config::EngineMode;
use backtrans::app_controller::Controller;
use backtrans::language_utils::SupportedLanguage;
use backtrans::providers::mock::{MockCompletion, MockEngine};
use backtrans::providers::{CompletionProvider, EngineKind, TranslationEngine};
use backtrans::translation::quality::{AnalysisMethod, SelectionMethod};

use crate::common::{self, as_engine, working_engines};

#[tokio::test]
async fn test_controller_runAnalysis_shouldWriteReportFile() {
    let dir = common::create_temp_dir().unwrap();
    let report_path = dir.path().join("reports").join("analysis.txt");

    let mut config = common::valid_config();
    config.output.save_report = true;
    config.output.report_path = report_path.to_string_lossy().to_string();

    let (deepl, deepseek) = working_engines();
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), None);

    let report = controller.run_analysis("今天天气很好").await.unwrap();

    assert_eq!(report.source_language, SupportedLanguage::Chinese);
    assert_eq!(report.target_language, SupportedLanguage::English);
    assert!(report.consistency.is_consistent);

    let saved = std::fs::read_to_string(&report_path).unwrap();
    assert!(saved.contains("Original text:"));
    assert!(saved.contains("今天天气很好"));
    assert!(saved.contains("Similarity score: 1.000"));
}

#[tokio::test]
async fn test_controller_reportNotWritable_shouldReturnError() {
    let dir = common::create_temp_dir().unwrap();
    let blocker = common::create_test_file(dir.path(), "blocker", b"not a directory").unwrap();

    let mut config = common::valid_config();
    config.output.save_report = true;
    config.output.report_path = blocker.join("analysis.txt").to_string_lossy().to_string();

    let (deepl, deepseek) = working_engines();
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), None);

    let err = controller.run_analysis("你好").await.unwrap_err();
    assert!(err.to_string().contains("Failed to save report"));
}

#[tokio::test]
async fn test_controller_saveReportDisabled_shouldNotWriteFile() {
    let dir = common::create_temp_dir().unwrap();
    let report_path = dir.path().join("analysis.txt");

    let mut config = common::valid_config();
    config.output.report_path = report_path.to_string_lossy().to_string();

    let (deepl, deepseek) = working_engines();
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), None);
    controller.run_analysis("你好").await.unwrap();

    assert!(!report_path.exists());
}

#[tokio::test]
async fn test_controller_llmAssessment_shouldDriveSelection() {
    let config = common::valid_config();
    let (deepl, deepseek) = working_engines();
    let llm: Arc<dyn CompletionProvider> = Arc::new(MockCompletion::replying(
        r#"{"deepl": {"accuracy": 0.6, "fluency": 0.6, "cultural_adaptation": 0.6, "completeness": 0.6},
            "deepseek": {"accuracy": 0.95, "fluency": 0.95, "cultural_adaptation": 0.95, "completeness": 0.95}}"#,
    ));
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), Some(llm));

    let report = controller.run_analysis("今天天气很好").await.unwrap();

    assert_eq!(report.chunk_methods[0].method, SelectionMethod::DeepseekSelected);
    // Identical round trip never reaches the judge
    assert_eq!(report.consistency.method, AnalysisMethod::Exact);
}

#[tokio::test]
async fn test_controller_llmDisabled_shouldFallBackToFeatures() {
    let mut config = common::valid_config();
    config.analysis.use_llm_assessment = false;
    config.analysis.use_llm_analysis = false;

    let (deepl, deepseek) = working_engines();
    let llm = Arc::new(MockCompletion::replying("unused"));
    let controller = Controller::from_parts(
        config,
        as_engine(&deepl),
        as_engine(&deepseek),
        Some(llm.clone() as Arc<dyn CompletionProvider>),
    );

    let report = controller.run_analysis("请您查收附件").await.unwrap();

    assert_eq!(report.chunk_methods[0].method, SelectionMethod::DeeplFormal);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn test_controller_chunkingConfig_shouldSplitLongText() {
    let mut config = common::valid_config();
    config.chunking.max_chunk_size = 8;
    config.chunking.overlap_size = 2;
    config.chunking.concurrent_requests = 2;

    let (deepl, deepseek) = working_engines();
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), None);

    let text = "一二三四五。六七八九十。甲乙丙丁戊。";
    let report = controller.run_analysis(text).await.unwrap();

    assert!(report.is_long_text);
    assert_eq!(report.chunks_count, 3);
    assert_eq!(report.max_chunk_size, 8);
    assert_eq!(report.overlap_size, 2);
    assert_eq!(report.back_translation, text);
}

#[tokio::test]
async fn test_controller_invalidLanguage_shouldFail() {
    let mut config = common::valid_config();
    config.target_language = "Klingon".to_string();

    let (deepl, deepseek) = working_engines();
    let controller = Controller::from_parts(config, as_engine(&deepl), as_engine(&deepseek), None);

    assert!(controller.run_analysis("你好").await.is_err());
}

#[test]
fn test_controller_testConnections_shouldReportEachEngine() {
    let config = common::valid_config();
    let deepl: Arc<dyn TranslationEngine> = Arc::new(MockEngine::working(EngineKind::DeepL));
    let deepseek: Arc<dyn TranslationEngine> = Arc::new(MockEngine::failing(EngineKind::DeepSeek));
    let controller = Controller::from_parts(config, Some(deepl), Some(deepseek), None);

    let results = tokio_test::block_on(async { controller.test_connections().await });

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, EngineKind::DeepL);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, EngineKind::DeepSeek);
    assert!(results[1].1.is_err());
}

#[test]
fn test_controller_withConfig_noUsableEngine_shouldFail() {
    let mut config = common::valid_config();
    config.engines.mode = EngineMode::DeepSeek;
    config.engines.deepseek.api_key.clear();

    let err = Controller::with_config(config).err().unwrap();
    assert!(err.to_string().contains("No translation engine"));
}

#[test]
fn test_controller_languages_shouldFlagDeeplSupport() {
    let languages = Controller::languages();
    assert_eq!(languages.len(), SupportedLanguage::ALL.len());
    assert!(languages.contains(&(SupportedLanguage::Thai, true)));
    assert!(languages.contains(&(SupportedLanguage::Lao, false)));
}

#[tokio::test]
async fn test_controller_withConfig_deepseekMode_shouldCallServer() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Hello"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 2}}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let mut config = common::valid_config();
    config.engines.mode = EngineMode::DeepSeek;
    config.engines.deepseek.endpoint = server.url();
    config.analysis.use_llm_assessment = false;
    config.analysis.use_llm_analysis = false;

    let controller = Controller::with_config(config).unwrap();
    let report = controller.run_analysis("你好").await.unwrap();

    assert_eq!(report.target_translation, "Hello");
    assert_eq!(report.back_translation, "Hello");
    assert_eq!(report.engines, "DeepSeek");
    assert_eq!(report.consistency.method, AnalysisMethod::Fallback);
    assert!(!report.consistency.is_consistent);
    assert_eq!(report.usage["DeepSeek"].requests, 2);
    assert_eq!(report.usage["DeepSeek"].prompt_tokens, 20);
    mock.assert_async().await;
}
