//! Audio assembly and encoding: WAV concatenation plus MP3 transcode.

pub mod assembler;
pub mod encoder;

pub use assembler::{concatenate_wavs, AssemblyError};
pub use encoder::{is_ffmpeg_available, transcode_to_mp3, TranscodeError};

/// ID3 metadata attached to a finished chapter MP3.
#[derive(Debug, Clone)]
pub struct TrackTags {
    /// Chapter title
    pub title: String,
    /// Book author
    pub artist: String,
    /// Book title
    pub album: String,
    /// Chapter number
    pub track: u32,
}

impl TrackTags {
    /// Key/value pairs in the form ffmpeg's `-metadata` expects.
    pub fn metadata(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("artist", self.artist.clone()),
            ("album", self.album.clone()),
            ("track", self.track.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_tags_metadata() {
        let tags = TrackTags {
            title: "Chapter_One".to_string(),
            artist: "Jane Author".to_string(),
            album: "My Book".to_string(),
            track: 7,
        };

        let pairs = tags.metadata();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&("title", "Chapter_One".to_string())));
        assert!(pairs.contains(&("artist", "Jane Author".to_string())));
        assert!(pairs.contains(&("album", "My Book".to_string())));
        assert!(pairs.contains(&("track", "7".to_string())));
    }
}
