//! Text processing for TTS: per-language chunking of chapter text.

pub mod chunker;
