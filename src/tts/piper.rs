//! Piper TTS backend.
//!
//! Spawns the `piper` binary once per chunk, feeding the text on stdin and
//! letting Piper write the WAV itself.

use super::SpeechEngine;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Speech engine backed by the Piper CLI and an ONNX voice model.
pub struct PiperEngine {
    model: PathBuf,
}

impl PiperEngine {
    /// Create an engine using the given `.onnx` voice model.
    pub fn new(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl SpeechEngine for PiperEngine {
    fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        let mut child = Command::new("piper")
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn piper; is it installed and on PATH?")?;

        // Closing stdin signals end of input to piper.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .context("failed to write chunk text to piper")?;
        }

        let output = child
            .wait_with_output()
            .context("failed to wait for piper")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "piper exited with {} for {}: {}",
                output.status,
                output_path.display(),
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesize_with_bogus_model_fails_gracefully() {
        // Without piper installed the spawn fails; with it installed the
        // nonexistent model makes piper exit nonzero. Either way this must
        // come back as an error, not a panic.
        let dir = tempfile::TempDir::new().unwrap();
        let engine = PiperEngine::new(dir.path().join("no-such-model.onnx"));
        let result = engine.synthesize("hello", &dir.path().join("out.wav"));
        assert!(result.is_err());
    }
}
