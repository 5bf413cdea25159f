//! Pipeline driver: validates the chapter range and synthesizes each chapter.

use crate::audio::TrackTags;
use crate::epub::{self, Chapter};
use crate::synth::{self, ChapterOutcome};
use crate::text::chunker;
use crate::tts::SpeechEngine;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Invalid user-provided chapter bounds. Fatal to the whole run; raised
/// before any chapter is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("chapter start index {start} is out of range (book has {count} chapters)")]
    StartOutOfRange { start: i64, count: usize },

    #[error("chapter end index {end} is out of range (book has {count} chapters)")]
    EndOutOfRange { end: i64, count: usize },

    #[error("chapter start index {start} is larger than chapter end index {end}")]
    StartAfterEnd { start: i64, end: i64 },
}

/// Inclusive 1-based chapter range, resolved from user bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRange {
    pub start: usize,
    pub end: usize,
}

impl ChapterRange {
    /// Whether `number` (1-based) falls inside the range.
    pub fn contains(&self, number: u32) -> bool {
        number as usize >= self.start && number as usize <= self.end
    }
}

/// Resolve user chapter bounds against the book's chapter count.
///
/// `end == -1` means "the last chapter". Bounds outside `1..=count` (or an
/// inverted range) are rejected.
pub fn resolve_range(count: usize, start: i64, end: i64) -> Result<ChapterRange, RangeError> {
    if start < 1 || start > count as i64 {
        return Err(RangeError::StartOutOfRange { start, count });
    }
    if end < -1 || end > count as i64 {
        return Err(RangeError::EndOutOfRange { end, count });
    }

    let end = if end == -1 { count as i64 } else { end };
    if start > end {
        return Err(RangeError::StartAfterEnd { start, end });
    }

    Ok(ChapterRange {
        start: start as usize,
        end: end as usize,
    })
}

/// Options for converting one book.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Language tag; `zh*` selects character-run chunking
    pub language: String,
    /// Output directory; defaults to the EPUB's parent directory
    pub output_dir: Option<PathBuf>,
    /// First chapter to convert, 1-based
    pub chapter_start: i64,
    /// Last chapter to convert; -1 means the last chapter
    pub chapter_end: i64,
    /// Strip endnote numbers from chapter text
    pub remove_endnotes: bool,
    /// Chunk-size override; defaults to the language-appropriate maximum
    pub max_chars: Option<usize>,
}

/// Per-book conversion counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// File name for a chapter's MP3: zero-padded number plus sanitized title.
pub fn chapter_file_name(chapter: &Chapter) -> String {
    format!("{:04}_{}.mp3", chapter.number, chapter.title)
}

/// Convert one EPUB into per-chapter MP3s.
///
/// A failure inside one chapter aborts that chapter but not the rest; the
/// summary reports how many chapters failed so the caller can exit nonzero.
pub fn convert_book(
    engine: &dyn SpeechEngine,
    epub_path: &Path,
    options: &ConvertOptions,
) -> Result<RunSummary> {
    let book = epub::parse_book(epub_path, options.remove_endnotes)
        .with_context(|| format!("failed to parse {}", epub_path.display()))?;

    let chapter_count = book.chapters.len();
    let range = resolve_range(chapter_count, options.chapter_start, options.chapter_end)?;

    let output_dir = options.output_dir.clone().unwrap_or_else(|| {
        epub_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let max_chars = options
        .max_chars
        .unwrap_or_else(|| chunker::max_chars_for_language(&options.language));

    eprintln!("Book: \"{}\" by {}", book.info.title, book.info.author);
    eprintln!(
        "Chapters: {}, converting {} to {}",
        chapter_count, range.start, range.end
    );

    let pb = ProgressBar::new((range.end - range.start + 1) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut summary = RunSummary::default();

    for chapter in &book.chapters {
        if !range.contains(chapter.number) {
            continue;
        }

        let output_file = output_dir.join(chapter_file_name(chapter));
        pb.set_message(format!("{}/{}: {}", chapter.number, chapter_count, chapter.title));

        let tags = TrackTags {
            title: chapter.title.clone(),
            artist: book.info.author.clone(),
            album: book.info.title.clone(),
            track: chapter.number,
        };

        match synth::synthesize_chapter(
            engine,
            chapter,
            &options.language,
            max_chars,
            &output_file,
            &tags,
        ) {
            Ok(ChapterOutcome::Written) => summary.written += 1,
            Ok(ChapterOutcome::SkippedEmpty) => summary.skipped += 1,
            Err(e) => {
                summary.failed += 1;
                pb.suspend(|| eprintln!("chapter {} failed: {}", chapter.number, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    eprintln!(
        "Written: {}, skipped: {}, failed: {}",
        summary.written, summary.skipped, summary.failed
    );

    Ok(summary)
}
