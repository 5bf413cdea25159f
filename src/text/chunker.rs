//! Text chunking for TTS processing.
//!
//! Piper has a practical ceiling on input size, so chapter text is split into
//! chunks before synthesis. Two strategies exist: whitespace-word accumulation
//! for most languages, and character-run accumulation for Chinese, where words
//! are not whitespace-delimited.

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHARS: usize = 3000;

/// Default maximum chunk size for Chinese text, which is denser per character.
pub const DEFAULT_MAX_CHARS_CHINESE: usize = 1800;

/// Full-width punctuation that must never be separated from its neighbor.
const CJK_PUNCTUATION: &str = "。，、？！：；\u{201c}\u{201d}\u{2018}\u{2019}（）《》【】…—～·「」『』〈〉〖〗〔〕∶";

/// Pick the default chunk ceiling for a language tag.
pub fn max_chars_for_language(language: &str) -> usize {
    if language.starts_with("zh") {
        DEFAULT_MAX_CHARS_CHINESE
    } else {
        DEFAULT_MAX_CHARS
    }
}

/// Split chapter text into TTS-sized chunks.
///
/// Chinese language tags (`zh*`) use character-run splitting; everything else
/// splits on whitespace words. Returns an empty list only for empty input;
/// callers treat that as "nothing to synthesize".
pub fn split_text(text: &str, max_chars: usize, language: &str) -> Vec<String> {
    if language.starts_with("zh") {
        split_character_runs(text, max_chars)
    } else {
        split_words(text, max_chars)
    }
}

/// Greedily accumulate whitespace-delimited words into chunks.
///
/// Words are joined by a single space while the chunk stays within
/// `max_chars`. A single word longer than the limit is never split; it
/// becomes its own oversized chunk.
fn split_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len + word_len + 1 <= max_chars {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Accumulate characters into chunks, never breaking an unsplittable run.
///
/// Unsplittable characters are always appended even past `max_chars`, so a
/// chunk can slightly exceed the limit when it ends in a run of ASCII or
/// CJK punctuation. The bound is soft, not strict.
fn split_character_runs(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for ch in text.chars() {
        if current_len + 1 <= max_chars || is_unsplittable(ch) {
            current.push(ch);
            current_len += 1;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push(ch);
            current_len = 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// ASCII printable characters and full-width CJK punctuation never start a
/// new chunk; breaking inside such a run garbles the synthesized speech.
fn is_unsplittable(ch: char) -> bool {
    ch.is_ascii_graphic() || CJK_PUNCTUATION.contains(ch)
}
