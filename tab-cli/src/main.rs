//! # Guitar Tab - Command-line front-end
//!
//! Records (or loads) a mono performance, transcribes it with `tab-core`
//! and prints the detected notes followed by ASCII guitar tablature.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tab_core::{audio, transcribe, wav, AudioBuffer, Transcription, TranscriptionConfig};

/// Guitar Tab - turn a single-note performance into tablature
#[derive(Parser)]
#[command(name = "guitar-tab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file overriding transcription parameters
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record from the default input device, then transcribe
    Record {
        /// Seconds of audio to record
        #[arg(short, long)]
        seconds: u32,

        /// Where to save the recording as WAV
        #[arg(short, long, default_value = "recording.wav")]
        output: PathBuf,

        /// Do not save the recording
        #[arg(long)]
        no_save: bool,

        /// Seconds to count down before recording starts
        #[arg(long, default_value_t = 3)]
        countdown: u32,
    },

    /// Transcribe an existing WAV file
    Transcribe {
        /// Path to the WAV file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TranscriptionConfig::load(path)?,
        None => TranscriptionConfig::default(),
    };

    let buffer = match cli.command {
        Commands::Record { seconds, output, no_save, countdown: count } => {
            if seconds == 0 {
                bail!("recording length must be at least one second");
            }
            let buffer = record_audio(seconds, count)?;
            if !no_save {
                wav::write_wav(&output, &buffer)?;
                info!("saved recording to {}", output.display());
            }
            buffer
        }
        Commands::Transcribe { input } => wav::read_wav(&input)?,
    };

    let transcription = transcribe(&buffer, &config).context("transcription failed")?;
    print_transcription(&transcription);
    Ok(())
}

fn record_audio(seconds: u32, count: u32) -> Result<AudioBuffer> {
    countdown(count, seconds);
    println!("Recording!");
    let buffer = audio::record(Duration::from_secs(seconds as u64))?;
    println!("Done Recording.");
    Ok(buffer)
}

fn countdown(count: u32, seconds: u32) {
    println!("\nGet ready to record for {} seconds in...", seconds);
    for i in (1..=count).rev() {
        println!("{}...", i);
        thread::sleep(Duration::from_secs(1));
    }
}

fn print_transcription(transcription: &Transcription) {
    println!("\nDetected Notes:\n");
    for event in &transcription.events {
        println!("{}", event);
    }

    println!("\nGuitar Tabs:\n");
    println!("{}", transcription.tablature);
}
