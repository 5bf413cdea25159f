//! Speech engine boundary.
//!
//! Synthesis is a blocking external invocation behind one trait method, so
//! tests can substitute an engine that writes canned audio without spawning
//! any process.

pub mod piper;

use anyhow::Result;
use std::path::Path;

/// A text-to-speech engine that renders one chunk of text to a WAV file.
pub trait SpeechEngine {
    /// Synthesize `text` into a WAV file at `output_path`. Blocks until the
    /// engine finishes; any failure aborts the chapter being synthesized.
    fn synthesize(&self, text: &str, output_path: &Path) -> Result<()>;
}
