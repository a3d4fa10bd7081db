//! Test helper modules for gamix-engine integration tests
//!
//! - audio_generator: deterministic WAV fixtures written with hound
//! - headless contexts sized for quick tick-by-tick assertions

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{write_constant_wav, write_sine_wav, TEST_CHANNELS, TEST_SAMPLE_RATE};

use gamix_engine::{AudioContext, MixerConfig};

/// Headless context with the default format and the given one-shot cap
pub fn headless_context(max_one_shots: usize) -> AudioContext {
    let config = MixerConfig {
        max_concurrent_one_shots: max_one_shots,
        ..MixerConfig::default()
    };
    AudioContext::headless(config).expect("valid test config")
}

/// Run `ticks` callbacks of `samples` interleaved samples each
pub fn render_ticks(context: &AudioContext, ticks: usize, samples: usize) -> Vec<i16> {
    let mut out = vec![0i16; samples];
    for _ in 0..ticks {
        assert!(context.render(&mut out));
    }
    out
}
