//! Playback: instance lifecycle, the mixer and the control API

pub mod controller;
pub mod crossfade;
pub mod instance;
pub mod mixer;
pub mod registry;
pub mod types;

pub use controller::{PlaySource, PlaybackController};
pub use instance::{PlaybackInstance, SampleBuffer, Sound};
pub use mixer::Mixer;
pub use registry::PlaybackRegistry;
pub use types::{InstanceSnapshot, MixerSnapshot, PlayOutcome};
