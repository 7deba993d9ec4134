/*!
 * Tests for report rendering
 */

use chrono::{Local, TimeZone};

use backtrans::language_utils::SupportedLanguage;
use backtrans::providers::mock::MockEngine;
use backtrans::providers::{EngineKind, TranslationEngine};
use backtrans::report::{render_console, render_json, render_text_report, save_text_report};
use backtrans::translation::quality::{SemanticAnalyzer, ThresholdPolicy};
use backtrans::translation::{DualEngineTranslator, RoundTripAnalyzer, RoundTripReport, TextChunker};
use std::sync::Arc;

use crate::common;

async fn sample_report(text: &str, chunker: TextChunker) -> RoundTripReport {
    let deepl: Arc<dyn TranslationEngine> = Arc::new(MockEngine::working(EngineKind::DeepL));
    let deepseek: Arc<dyn TranslationEngine> = Arc::new(MockEngine::working(EngineKind::DeepSeek));
    let translator = DualEngineTranslator::new(Some(deepl), Some(deepseek)).unwrap();
    RoundTripAnalyzer::new(translator, SemanticAnalyzer::heuristic(ThresholdPolicy::default()), chunker)
        .run(text, SupportedLanguage::Chinese, SupportedLanguage::Thai)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_renderTextReport_shortText_shouldContainAllSections() {
    let report = sample_report("今天天气很好", TextChunker::default()).await;
    let finished_at = Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

    let text = render_text_report(&report, finished_at);

    assert!(text.contains("Source language: Chinese"));
    assert!(text.contains("Target language: Thai"));
    assert!(text.contains("Text length: 6 characters"));
    assert!(text.contains("Long text: no"));
    assert!(text.contains("Thai translation:"));
    assert!(text.contains("[th] 今天天气很好"));
    assert!(text.contains("Similarity score: 1.000"));
    assert!(text.contains("Consistent: yes"));
    assert!(text.contains("Finished at: 2024-05-01 12:30:00"));
    assert!(!text.contains("Long-text processing"));
}

#[tokio::test]
async fn test_renderTextReport_longText_shouldDescribeChunking() {
    let report = sample_report("这是第一句话。这是第二句话。这是第三句话。", TextChunker::new(8, 3)).await;
    let text = render_text_report(&report, Local::now());

    assert!(text.contains("Long text: yes"));
    assert!(text.contains("Chunks: 3"));
    assert!(text.contains("- Maximum chunk length: 8 characters"));
    assert!(text.contains("- Context between chunks: 3 characters"));
    assert!(text.contains("chunk 3:"));
}

#[tokio::test]
async fn test_renderConsole_longOriginal_shouldTruncate() {
    let original = "这是一个很长的句子。".repeat(30);
    let report = sample_report(&original, TextChunker::new(1000, 100)).await;

    let console = render_console(&report);

    assert!(console.contains("full length: 300 characters"));
    assert!(console.contains("Chinese -> Thai -> Chinese"));
    assert!(console.contains("Selected:"));
}

#[tokio::test]
async fn test_renderJson_shouldSerializeReport() {
    let report = sample_report("你好", TextChunker::default()).await;
    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

    assert_eq!(json["source_language"], "chinese");
    assert_eq!(json["target_language"], "thai");
    assert_eq!(json["back_translation"], "你好");
    assert_eq!(json["consistency"]["is_identical"], true);
    assert_eq!(json["chunks_count"], 1);
    assert!(json["usage"]["DeepL"]["requests"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_saveTextReport_shouldWriteFile() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("output.txt");
    let report = sample_report("你好", TextChunker::default()).await;

    save_text_report(&report, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("Original text:"));
    assert!(written.contains("你好"));
}
