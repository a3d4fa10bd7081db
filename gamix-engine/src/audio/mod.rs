//! Audio I/O: device output, WAV loading and the PCM format

pub mod decode;
pub mod output;
pub mod types;

pub use decode::SoundLoader;
pub use output::AudioOutput;
pub use types::{FormatSpec, SampleFormat, MAX_VOLUME};
