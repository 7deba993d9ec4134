/*!
 * Rendering of round-trip reports for the console, the text report file
 * and JSON output.
 */

use anyhow::Result;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;

use crate::file_utils::FileManager;
use crate::translation::RoundTripReport;

/// Characters of each text shown on the console
pub const CONSOLE_PREVIEW_CHARS: usize = 200;

const RULE: &str = "============================================================";
const SUBRULE: &str = "------------------------------";

/// Shorten `text` to `max_chars`, noting the full length when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...\n   [showing first {} characters, full length: {} characters]", head, max_chars, total)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Summary printed to stdout after an analysis
pub fn render_console(report: &RoundTripReport) -> String {
    let mut out = String::new();
    let consistency = &report.consistency;

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "Round-trip analysis: {} -> {} -> {} ({})",
        report.source_language, report.target_language, report.source_language, report.engines
    );
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Original ({}):\n   {}", report.source_language, preview(&report.original_text, CONSOLE_PREVIEW_CHARS));
    let _ = writeln!(out, "Translation ({}):\n   {}", report.target_language, preview(&report.target_translation, CONSOLE_PREVIEW_CHARS));
    let _ = writeln!(out, "Back-translation ({}):\n   {}", report.source_language, preview(&report.back_translation, CONSOLE_PREVIEW_CHARS));
    let _ = writeln!(out, "{}", SUBRULE);
    let _ = writeln!(
        out,
        "Similarity: {:.3} (threshold {:.3}) - {}",
        consistency.score, consistency.threshold, consistency.level.label()
    );
    let _ = writeln!(out, "Consistent: {}", yes_no(consistency.is_consistent));
    if report.is_long_text {
        let _ = writeln!(out, "Processed in {} chunks", report.chunks_count);
    } else if let Some(record) = report.chunk_methods.first() {
        let _ = writeln!(out, "Selected: {} (confidence {:.2})", record.method, record.confidence);
    }
    let _ = writeln!(out, "Suggestion: {}", consistency.suggestion);
    out
}

/// Full text report as written to the report file
pub fn render_text_report(report: &RoundTripReport, finished_at: DateTime<Local>) -> String {
    let mut out = String::new();
    let consistency = &report.consistency;
    let source = report.source_language.english_name();
    let target = report.target_language.english_name();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Round-trip translation analysis");
    let _ = writeln!(out, "{}\n", RULE);

    let _ = writeln!(out, "Source language: {}", source);
    let _ = writeln!(out, "Target language: {}", target);
    let _ = writeln!(out, "Engines: {}", report.engines);
    let _ = writeln!(out, "Text length: {} characters", report.text_length);
    let _ = writeln!(out, "Long text: {}", yes_no(report.is_long_text));
    if report.is_long_text {
        let _ = writeln!(out, "Chunks: {}", report.chunks_count);
    }
    let _ = writeln!(out);

    for (title, body) in [
        ("Original text".to_string(), &report.original_text),
        (format!("{} translation", target), &report.target_translation),
        (format!("{} back-translation", source), &report.back_translation),
    ] {
        let _ = writeln!(out, "{}:\n{}\n{}\n", title, SUBRULE, body);
    }

    let _ = writeln!(out, "Semantic consistency:\n{}", SUBRULE);
    let _ = writeln!(out, "Similarity score: {:.3}", consistency.score);
    let _ = writeln!(out, "Consistency level: {}", consistency.level.label());
    let _ = writeln!(out, "Consistent: {}", yes_no(consistency.is_consistent));
    let _ = writeln!(out, "Threshold: {:.3}", consistency.threshold);
    let _ = writeln!(out, "Semantic meaning: {}", consistency.verdict);
    let _ = writeln!(out, "Confidence: {:.3}\n", consistency.confidence);
    let _ = writeln!(out, "Analysis:\n{}\n", consistency.analysis);
    let _ = writeln!(out, "Suggestion:\n{}\n", consistency.suggestion);

    if report.is_long_text {
        let _ = writeln!(out, "Long-text processing:\n{}", SUBRULE);
        let _ = writeln!(out, "- Split into {} chunks", report.chunks_count);
        let _ = writeln!(out, "- Maximum chunk length: {} characters", report.max_chunk_size);
        let _ = writeln!(out, "- Context between chunks: {} characters", report.overlap_size);
        let _ = writeln!(out, "- Chunks translated separately, back-translated by the other engine, then merged");
        for record in &report.chunk_methods {
            let back = record.back_engine.map(|e| e.display_name()).unwrap_or("-");
            let _ = writeln!(
                out,
                "  chunk {}: {} (confidence {:.2}), back-translated by {}",
                record.index + 1,
                record.method,
                record.confidence,
                back
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Finished at: {}", finished_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", RULE);
    out
}

/// Pretty JSON of the whole report
pub fn render_json(report: &RoundTripReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the text report to `path`
pub fn save_text_report<P: AsRef<Path>>(report: &RoundTripReport, path: P) -> Result<()> {
    FileManager::write_to_file(path, &render_text_report(report, Local::now()))
}
