//! Core audio types
//!
//! The engine mixes one fixed format: interleaved signed 16-bit PCM at the
//! rate and channel count negotiated at init. Producers must deliver audio
//! already in that format.

use gamix_common::MixerConfig;

/// Full-scale mixing volume
pub const MAX_VOLUME: u8 = 128;

/// Sample encoding of a PCM buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian
    S16Le,
}

impl SampleFormat {
    /// Bytes per single-channel sample
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::S16Le => 2,
        }
    }
}

/// Negotiated PCM format of the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub sample_format: SampleFormat,
    pub channels: u16,
    pub frequency: u32,
}

impl FormatSpec {
    /// Device format requested by a configuration
    pub fn from_config(config: &MixerConfig) -> Self {
        Self {
            sample_format: SampleFormat::S16Le,
            channels: config.channel_count,
            frequency: config.sample_rate,
        }
    }
}

/// Clamp a caller-supplied volume to `[0, MAX_VOLUME]`
pub fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, MAX_VOLUME as i32) as u8
}
