//! # gamix Mixing Engine (gamix-engine)
//!
//! Real-time software mixer for game audio.
//!
//! **Purpose:** Decode WAV files into memory, keep a list of playing sounds
//! and music tracks, and mix them into every audio device callback.
//!
//! **Architecture:** symphonia decodes to interleaved i16, a slot-pool
//! registry holds the playing instances, and a cpal output stream calls the
//! mixer once per buffer.
//!
//! - One-shot effects are capped; requests beyond the cap are dropped
//! - Starting a music track fades the current one out before it begins
//! - Loop tracks rewind in the same callback that exhausts them

pub mod audio;
pub mod context;
pub mod error;
pub mod playback;

pub use context::AudioContext;
pub use error::{DecodeError, Error, Result};
pub use gamix_common::MixerConfig;
pub use playback::{MixerSnapshot, PlayOutcome, PlaySource, PlaybackController, Sound};
