//! gamix-engine demo player
//!
//! Opens the audio device, loops a music track and fires sound effects on
//! an interval. Useful for checking a device and config by ear.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use gamix_common::{ConfigResolver, MixerConfig};
use gamix_engine::audio::AudioOutput;
use gamix_engine::{AudioContext, PlayOutcome};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Volume used for everything the demo plays
const DEMO_VOLUME: i32 = 100;

/// Command-line arguments for gamix-engine
#[derive(Parser, Debug)]
#[command(name = "gamix-engine")]
#[command(about = "Real-time game audio mixer demo")]
#[command(version)]
struct Args {
    /// Configuration file (overrides GAMIX_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// WAV file to loop as music
    #[arg(short, long)]
    music: Option<PathBuf>,

    /// WAV file to fire as a sound effect (repeatable)
    #[arg(short, long = "effect")]
    effects: Vec<PathBuf>,

    /// Milliseconds between effects
    #[arg(long, default_value = "250")]
    effect_interval_ms: u64,

    /// How long to play before shutting down
    #[arg(short, long, default_value = "10")]
    seconds: u64,

    /// Print output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new()
        .with_cli_path(args.config.clone())
        .resolve()
        .context("Failed to load configuration")?;

    init_tracing(&config);

    if args.list_devices {
        let devices = AudioOutput::list_devices().context("Failed to list audio devices")?;
        for name in devices {
            println!("{}", name);
        }
        return Ok(());
    }

    info!(
        "Starting gamix-engine: {} Hz, {} channels, {} frames per callback",
        config.sample_rate, config.channel_count, config.callback_buffer_size
    );

    let context = AudioContext::init(config);
    if !context.is_enabled() {
        warn!("No audio device available, nothing will be heard");
    }

    if let Some(music) = &args.music {
        let outcome = context.controller().play_music(music, DEMO_VOLUME);
        info!("Music {}: {:?}", music.display(), outcome);
    }

    let mut templates = Vec::with_capacity(args.effects.len());
    for path in &args.effects {
        match context.controller().load(path, false, DEMO_VOLUME) {
            Ok(sound) => templates.push(sound),
            Err(e) => warn!("Skipping effect {}: {}", path.display(), e),
        }
    }

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let interval = Duration::from_millis(args.effect_interval_ms.max(1));
    let mut fired = 0usize;
    let mut dropped = 0usize;

    while Instant::now() < deadline {
        if !templates.is_empty() {
            let template = &templates[fired % templates.len()];
            match context.controller().play_sound_from_memory(template, DEMO_VOLUME) {
                PlayOutcome::Queued => {}
                _ => dropped += 1,
            }
            fired += 1;
        }

        if context.has_device_error() {
            warn!("Audio device reported {} error(s)", context.device_error_count());
            context.clear_device_error();
        }

        thread::sleep(interval);
    }

    let snapshot = context.snapshot();
    info!(
        "Fired {} effect(s), {} dropped; {} callback(s) mixed",
        fired, dropped, snapshot.callbacks
    );

    context.shutdown();
    Ok(())
}

/// Initialize tracing, preferring RUST_LOG over the configured level
fn init_tracing(config: &MixerConfig) {
    let fallback = format!("gamix_engine={},gamix_common={}", config.logging.level, config.logging.level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
