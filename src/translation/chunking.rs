/*!
 * Long-text chunking and merging.
 *
 * Texts longer than `max_chunk_size` characters are split at sentence ends
 * (or whitespace) near the size limit. Chunk bodies never overlap:
 * concatenating them reproduces the input. The `overlap_size` characters
 * before each chunk travel with it as read-only context so the engine sees
 * how the previous chunk ended.
 */

use serde::{Deserialize, Serialize};

/// Default chunk size in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Default context length in characters
pub const DEFAULT_OVERLAP_SIZE: usize = 100;

/// Characters that end a sentence
const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '.', '!', '?'];

/// How far back from the size limit to look for a sentence end
const SENTENCE_SEARCH_WINDOW: usize = 200;

/// How far back from the size limit to look for whitespace
const WHITESPACE_SEARCH_WINDOW: usize = 100;

/// A piece of a long text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Zero-based position among the kept chunks
    pub index: usize,
    /// Raw chunk body, untrimmed
    pub text: String,
    /// Text immediately before the body, for reference only
    pub context: Option<String>,
    /// Character offset of the body in the input
    pub start_char: usize,
    /// Character offset one past the body
    pub end_char: usize,
}

impl TextChunk {
    /// Body with surrounding whitespace removed, as sent to engines
    pub fn content(&self) -> &str {
        self.text.trim()
    }

    pub fn char_count(&self) -> usize {
        self.end_char - self.start_char
    }
}

/// Splits long texts into chunks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextChunker {
    max_chunk_size: usize,
    overlap_size: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
        }
    }
}

impl TextChunker {
    /// Create a chunker
    ///
    /// A zero size is raised to 1 and the overlap is capped below the size.
    pub fn new(max_chunk_size: usize, overlap_size: usize) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap_size: overlap_size.min(max_chunk_size - 1),
        }
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// Whether a text needs chunking
    pub fn is_long_text(&self, text: &str) -> bool {
        text.chars().count() > self.max_chunk_size
    }

    /// Split `text` into chunks
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < len {
            let end = self.chunk_end(&chars, start);

            let body: String = chars[start..end].iter().collect();
            if !body.trim().is_empty() {
                let context_start = start.saturating_sub(self.overlap_size);
                let context: String = chars[context_start..start].iter().collect();
                let context = context.trim();

                chunks.push(TextChunk {
                    index: chunks.len(),
                    text: body,
                    context: (!context.is_empty()).then(|| context.to_string()),
                    start_char: start,
                    end_char: end,
                });
            }

            start = end;
        }

        chunks
    }

    // @returns: Exclusive end of the chunk starting at `start`, always > start
    fn chunk_end(&self, chars: &[char], start: usize) -> usize {
        let len = chars.len();
        let end = start + self.max_chunk_size;
        if end >= len {
            return len;
        }

        let half = start + self.max_chunk_size / 2;

        let sentence_floor = half.max(end.saturating_sub(SENTENCE_SEARCH_WINDOW));
        if let Some(i) = (sentence_floor + 1..=end)
            .rev()
            .find(|&i| SENTENCE_TERMINATORS.contains(&chars[i]))
        {
            return i + 1;
        }

        let whitespace_floor = half.max(end.saturating_sub(WHITESPACE_SEARCH_WINDOW));
        if let Some(i) = (whitespace_floor + 1..=end)
            .rev()
            .find(|&i| chars[i].is_whitespace())
        {
            return i;
        }

        end
    }
}

/// Whether a character belongs to a script written without spaces
pub fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F     // CJK symbols and punctuation
        | 0x3040..=0x30FF   // kana
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFFEF   // fullwidth forms
        | 0x20000..=0x2A6DF)
}

/// Join translated chunk texts
///
/// Pieces are trimmed. A space goes between two pieces unless either side
/// of the boundary is CJK.
pub fn merge_translations<S: AsRef<str>>(parts: &[S]) -> String {
    let mut merged = String::new();

    for part in parts.iter().map(|p| p.as_ref().trim()).filter(|p| !p.is_empty()) {
        let needs_space = match (merged.chars().last(), part.chars().next()) {
            (Some(prev), Some(next)) => !is_cjk_char(prev) && !is_cjk_char(next),
            _ => false,
        };
        if needs_space {
            merged.push(' ');
        }
        merged.push_str(part);
    }

    merged
}
