//! MP3 encoding via FFmpeg.
//!
//! The concatenated chapter WAV is handed to ffmpeg for the final compressed
//! artifact. Book and chapter metadata ride along as `-metadata` arguments so
//! the MP3 comes out tagged in the same pass.

use super::TrackTags;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Errors while transcoding the assembled stream to MP3.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to run ffmpeg: {0}")]
    Launch(#[from] std::io::Error),

    #[error("ffmpeg exited with an error: {stderr}")]
    Failed { stderr: String },
}

/// Transcode a WAV file to an ID3-tagged MP3 at default encoder quality.
pub fn transcode_to_mp3(
    input: &Path,
    output: &Path,
    tags: &TrackTags,
) -> Result<(), TranscodeError> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-y", "-i"])
        .arg(input)
        .args(["-codec:a", "libmp3lame", "-qscale:a", "2"]);

    for (key, value) in tags.metadata() {
        cmd.arg("-metadata").arg(format!("{key}={value}"));
    }

    cmd.args(["-f", "mp3"]).arg(output);

    let result = cmd.output()?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).into_owned();
        return Err(TranscodeError::Failed { stderr });
    }

    Ok(())
}

/// Check if ffmpeg is available on the PATH.
pub fn is_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
