//! WAV fixture generation
//!
//! Files are written in the mixer's default format (48 kHz, stereo, 16-bit)
//! so they load without format warnings.

use hound::{WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

pub const TEST_SAMPLE_RATE: u32 = 48_000;
pub const TEST_CHANNELS: u16 = 2;

fn spec() -> WavSpec {
    WavSpec {
        channels: TEST_CHANNELS,
        sample_rate: TEST_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Stereo WAV where every sample equals `value`
///
/// A constant signal makes mixed output exact: one instance at volume `v`
/// contributes `value * v / 128` to every sample.
pub fn write_constant_wav<P: AsRef<Path>>(path: P, frames: usize, value: i16) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec())?;
    for _ in 0..frames * TEST_CHANNELS as usize {
        writer.write_sample(value)?;
    }
    writer.finalize()
}

/// Stereo sine wave at `frequency_hz`, amplitude 0.0-1.0
pub fn write_sine_wav<P: AsRef<Path>>(
    path: P,
    frames: usize,
    frequency_hz: f32,
    amplitude: f32,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec())?;
    for n in 0..frames {
        let t = n as f32 / TEST_SAMPLE_RATE as f32;
        let sample = ((2.0 * PI * frequency_hz * t).sin() * amplitude * i16::MAX as f32) as i16;
        for _ in 0..TEST_CHANNELS {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()
}
