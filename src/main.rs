//! read-to-me - Convert EPUB files to per-chapter MP3 audio with Piper TTS

mod audio;
mod config;
mod epub;
mod lock;
mod pipeline;
mod synth;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::AppConfig;
use lock::RunLock;
use pipeline::ConvertOptions;
use std::path::PathBuf;
use tts::piper::PiperEngine;

#[derive(Parser, Debug)]
#[command(name = "read-to-me")]
#[command(about = "Convert EPUB files to per-chapter MP3 audio using Piper TTS", long_about = None)]
#[command(version)]
struct Args {
    /// EPUB files to convert
    epub_files: Vec<PathBuf>,

    /// Output directory for chapter MP3s (default: next to each EPUB)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to the Piper voice model (.onnx)
    #[arg(long)]
    voice_model: Option<PathBuf>,

    /// Language tag; zh* selects character-run chunking
    #[arg(long)]
    language: Option<String>,

    /// First chapter to convert (1-based)
    #[arg(long, default_value_t = 1)]
    chapter_start: i64,

    /// Last chapter to convert (-1 means the last chapter)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    chapter_end: i64,

    /// Strip endnote numbers from chapter text
    #[arg(long, default_value_t = false)]
    remove_endnotes: bool,

    /// Maximum characters per TTS chunk (default depends on language)
    #[arg(long)]
    max_chars: Option<usize>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default Piper voice model
    SetVoice {
        /// Path to the .onnx voice model
        path: PathBuf,
    },
    /// Set the default language tag
    SetLanguage {
        /// Language tag, e.g. en-US or zh-CN
        value: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    if args.epub_files.is_empty() {
        anyhow::bail!(
            "must provide at least one EPUB file path. Run 'read-to-me --help' for usage."
        );
    }

    let config = AppConfig::load().context("failed to load configuration")?;

    let voice_model = args
        .voice_model
        .clone()
        .or(config.voice_model)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no voice model given; pass --voice-model or set voice_model in {}",
                AppConfig::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            )
        })?;
    if !voice_model.exists() {
        anyhow::bail!("voice model not found: {}", voice_model.display());
    }

    let language = args.language.clone().unwrap_or(config.language);

    // Held for the whole run; released (and the file removed) on drop, on
    // both the success and the error path.
    let mut run_lock = RunLock::acquire()?;

    let engine = PiperEngine::new(voice_model);
    let options = ConvertOptions {
        language,
        output_dir: args.output_dir.clone(),
        chapter_start: args.chapter_start,
        chapter_end: args.chapter_end,
        remove_endnotes: args.remove_endnotes,
        max_chars: args.max_chars.or(config.max_chunk_chars),
    };

    let mut failed_chapters = 0usize;
    for epub_path in &args.epub_files {
        if !epub_path.exists() {
            anyhow::bail!("EPUB file not found: {}", epub_path.display());
        }

        eprintln!("Processing EPUB: {}", epub_path.display());
        run_lock.note(&format!("Processing EPUB: {}", epub_path.display()));

        let summary = pipeline::convert_book(&engine, epub_path, &options)?;
        failed_chapters += summary.failed;
    }

    if failed_chapters > 0 {
        anyhow::bail!("{failed_chapters} chapter(s) failed to convert");
    }

    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load()?;
            println!("Configuration file: {:?}", AppConfig::config_path()?);
            println!();
            if let Some(model) = &config.voice_model {
                println!("voice_model = \"{}\"", model.display());
            } else {
                println!("voice_model = (none)");
            }
            println!("language = \"{}\"", config.language);
            match config.max_chunk_chars {
                Some(max) => println!("max_chunk_chars = {max}"),
                None => println!("max_chunk_chars = (language default)"),
            }
        }
        ConfigAction::SetVoice { path } => {
            let mut config = AppConfig::load()?;
            config.voice_model = Some(path.clone());
            config.save()?;
            println!("Default voice model set to: {}", path.display());
        }
        ConfigAction::SetLanguage { value } => {
            let mut config = AppConfig::load()?;
            config.language = value.clone();
            config.save()?;
            println!("Default language set to: {}", config.language);
        }
    }
    Ok(())
}
