//! EPUB parsing and text extraction.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static ENDNOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z.,!?;"'\u{201d})])\d+"#).expect("valid regex"));

/// How many characters of body text stand in for a missing chapter title.
const TITLE_FALLBACK_CHARS: usize = 60;

/// One document-level unit of a book, numbered in spine order starting at 1.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// 1-based ordinal in spine order
    pub number: u32,
    /// Sanitized title, safe for file names
    pub title: String,
    /// Extracted plain text; may be empty for image-only documents
    pub content: String,
}

/// Book-level metadata for tagging.
#[derive(Debug, Clone)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
}

/// Parsed EPUB book.
#[derive(Debug)]
pub struct Book {
    pub info: BookInfo,
    pub chapters: Vec<Chapter>,
}

/// Parse an EPUB file into book metadata and chapters.
///
/// Every document item in the spine becomes a chapter, in spine order (not
/// table-of-contents order), even when its text turns out empty; the pipeline
/// skips empty chapters at synthesis time so the numbering stays stable.
pub fn parse_book(path: &Path, remove_endnotes: bool) -> Result<Book> {
    let mut doc = epub::doc::EpubDoc::new(path)
        .map_err(|e| anyhow::anyhow!("failed to open EPUB {}: {}", path.display(), e))?;

    let info = extract_book_info(&doc);

    let mut chapters = Vec::new();
    let spine = doc.spine.clone();
    let mut number: u32 = 1;

    for spine_item in spine.iter() {
        if let Some((content_bytes, _mime)) = doc.get_resource(&spine_item.idref) {
            let html = String::from_utf8_lossy(&content_bytes).to_string();

            let content = extract_text(&html, remove_endnotes);
            let title = extract_title(&html, &content);

            chapters.push(Chapter {
                number,
                title,
                content,
            });
            number += 1;
        }
    }

    Ok(Book { info, chapters })
}

fn extract_book_info(doc: &epub::doc::EpubDoc<std::io::BufReader<std::fs::File>>) -> BookInfo {
    let title = doc
        .mdata("title")
        .map(|m| m.value.clone())
        .unwrap_or_else(|| "Untitled".to_string());
    let author = doc
        .mdata("creator")
        .map(|m| m.value.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    BookInfo { title, author }
}

/// Convert chapter HTML to normalized plain text.
fn extract_text(html: &str, remove_endnotes: bool) -> String {
    let text = html2text::from_read(html.as_bytes(), 1000);

    // Collapse all whitespace runs; chunking re-splits on spaces anyway.
    let cleaned = WHITESPACE.replace_all(text.trim(), " ").into_owned();

    if remove_endnotes {
        // Digit runs glued to a letter or closing punctuation are endnote
        // references, not spoken content.
        ENDNOTE.replace_all(&cleaned, "${1}").into_owned()
    } else {
        cleaned
    }
}

/// Pick a chapter title: the `<title>` tag if present, otherwise the first
/// characters of the body text. Always returned sanitized.
fn extract_title(html: &str, content: &str) -> String {
    let title = extract_title_tag(html)
        .unwrap_or_else(|| content.chars().take(TITLE_FALLBACK_CHARS).collect());
    sanitize_title(&title)
}

/// Extract the contents of the `<title>` element, if any.
fn extract_title_tag(html: &str) -> Option<String> {
    let html_lower = html.to_lowercase();
    let start = html_lower.find("<title")?;
    let tag_end = html_lower[start..].find('>')?;
    let content_start = start + tag_end + 1;
    let end = html_lower[content_start..].find("</title>")?;

    let title = strip_html_tags(&html[content_start..content_start + end]);
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Strip HTML tags from a string. An unterminated tag swallows the rest.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => return result,
        }
    }

    result.push_str(rest);
    result
}

/// Make a title safe for file names: strip everything but word characters
/// and whitespace, then collapse whitespace runs to single underscores.
pub fn sanitize_title(title: &str) -> String {
    let stripped = NON_WORD.replace_all(title, "");
    WHITESPACE.replace_all(stripped.trim(), "_").into_owned()
}
