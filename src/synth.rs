//! Chapter synthesis: chunk text, drive the speech engine, assemble audio.
//!
//! One call owns the full lifecycle for one chapter: a work area next to the
//! output file holds the per-chunk WAVs, the concatenated stream lands at a
//! path derived from the output file, and both are removed on every exit
//! path, success or failure.

use crate::audio::{self, AssemblyError, TrackTags, TranscodeError};
use crate::epub::Chapter;
use crate::text::chunker;
use crate::tts::SpeechEngine;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort synthesis of one chapter.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("speech engine failed on chunk {chunk}: {reason}")]
    Engine { chunk: usize, reason: anyhow::Error },

    #[error("could not create work area {}: {source}", .path.display())]
    WorkArea {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

/// What synthesizing one chapter produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// The chapter MP3 was written and tagged.
    Written,
    /// The chapter had no text; no file was created.
    SkippedEmpty,
}

/// Synthesize one chapter to an MP3 at `output_file`.
///
/// Chunks are synthesized strictly in order and their WAVs named by 0-based
/// index, so assembly order never depends on directory listing order. The
/// first engine failure aborts the remaining chunks; intermediates are
/// cleaned up regardless of how far synthesis got.
pub fn synthesize_chapter(
    engine: &dyn SpeechEngine,
    chapter: &Chapter,
    language: &str,
    max_chars: usize,
    output_file: &Path,
    tags: &TrackTags,
) -> Result<ChapterOutcome, SynthesisError> {
    let chunks = chunker::split_text(&chapter.content, max_chars, language);
    if chunks.is_empty() {
        eprintln!("  chapter {} has no text, skipping", chapter.number);
        return Ok(ChapterOutcome::SkippedEmpty);
    }

    let mut work = WorkArea::create(output_file.with_extension("work"))?;

    let mut chunk_wavs = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let wav = work.chunk_path(index);
        engine
            .synthesize(chunk, &wav)
            .map_err(|reason| SynthesisError::Engine {
                chunk: index,
                reason,
            })?;
        chunk_wavs.push(wav);
    }

    let concatenated = output_file.with_extension("wav");
    work.track_intermediate(concatenated.clone());

    audio::concatenate_wavs(&chunk_wavs, &concatenated)?;
    audio::transcode_to_mp3(&concatenated, output_file, tags)?;

    Ok(ChapterOutcome::Written)
}

/// Scoped directory for one chapter's intermediate audio.
///
/// Dropping the guard removes the tracked concatenated WAV and the whole
/// directory tree. Cleanup is best-effort and never fails: "already gone"
/// counts as success, and an error here must not mask the one that got us
/// onto the error path.
struct WorkArea {
    dir: PathBuf,
    intermediate: Option<PathBuf>,
}

impl WorkArea {
    fn create(dir: PathBuf) -> Result<Self, SynthesisError> {
        fs::create_dir_all(&dir).map_err(|source| SynthesisError::WorkArea {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            intermediate: None,
        })
    }

    /// Path for the chunk at `index`, named so ordering survives on disk.
    fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.wav"))
    }

    fn track_intermediate(&mut self, path: PathBuf) {
        self.intermediate = Some(path);
    }
}

impl Drop for WorkArea {
    fn drop(&mut self) {
        if let Some(path) = self.intermediate.take() {
            let _ = fs::remove_file(path);
        }
        let _ = fs::remove_dir_all(&self.dir);
    }
}
