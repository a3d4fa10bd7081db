//! Playback instances and decoded sound templates
//!
//! A [`Sound`] is a fully decoded buffer that callers keep around and play
//! many times. A [`PlaybackInstance`] is one playing copy of a sound, with
//! its own cursor, volume and loop/fade state.

use crate::audio::types::{clamp_volume, FormatSpec};
use std::sync::Arc;

/// Decoded interleaved samples, shared between a template and its instances
pub type SampleBuffer = Arc<[i16]>;

/// Decoded sound template
///
/// Cloning is cheap: clones share the sample buffer. The buffer is released
/// once the last template and the last instance playing it are gone.
#[derive(Debug, Clone)]
pub struct Sound {
    spec: FormatSpec,
    samples: SampleBuffer,
    looping: bool,
    volume: u8,
}

impl Sound {
    /// Wrap already-decoded samples
    ///
    /// `samples` must be interleaved in `spec`'s channel layout.
    pub fn new(spec: FormatSpec, samples: Vec<i16>, looping: bool, volume: i32) -> Self {
        Self {
            spec,
            samples: samples.into(),
            looping,
            volume: clamp_volume(volume),
        }
    }

    pub fn spec(&self) -> FormatSpec {
        self.spec
    }

    /// Interleaved sample count
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_loop(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Number of live handles to the sample buffer (this template included)
    pub fn buffer_refs(&self) -> usize {
        Arc::strong_count(&self.samples)
    }
}

/// One sound or music track currently playing
///
/// Lengths and the cursor count interleaved samples. Invariants:
/// `remaining_length <= total_length` and `volume <= MAX_VOLUME`.
#[derive(Debug)]
pub struct PlaybackInstance {
    spec: FormatSpec,
    buffer: SampleBuffer,
    owns_buffer: bool,
    total_length: usize,
    remaining_length: usize,
    cursor: usize,
    looping: bool,
    fade: bool,
    volume: u8,
}

impl PlaybackInstance {
    /// Take exclusive ownership of a freshly decoded sound
    pub(crate) fn owned(sound: Sound) -> Self {
        let total_length = sound.samples.len();
        Self {
            spec: sound.spec,
            buffer: sound.samples,
            owns_buffer: true,
            total_length,
            remaining_length: total_length,
            cursor: 0,
            looping: sound.looping,
            fade: false,
            volume: sound.volume,
        }
    }

    /// Independent playback state over a template's buffer
    pub(crate) fn shared(template: &Sound, looping: bool, volume: u8) -> Self {
        let total_length = template.samples.len();
        Self {
            spec: template.spec,
            buffer: Arc::clone(&template.samples),
            owns_buffer: false,
            total_length,
            remaining_length: total_length,
            cursor: 0,
            looping,
            fade: false,
            volume,
        }
    }

    pub fn spec(&self) -> FormatSpec {
        self.spec
    }

    pub fn is_loop(&self) -> bool {
        self.looping
    }

    pub fn is_fading(&self) -> bool {
        self.fade
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn remaining_length(&self) -> usize {
        self.remaining_length
    }

    pub fn remaining_bytes(&self) -> usize {
        self.remaining_length * self.spec.sample_format.bytes_per_sample()
    }

    pub fn owns_buffer(&self) -> bool {
        self.owns_buffer
    }

    /// Loop restart: cursor back to the start, full length remaining
    pub(crate) fn rewind(&mut self) {
        self.cursor = 0;
        self.remaining_length = self.total_length;
    }

    pub(crate) fn begin_fade(&mut self) {
        self.fade = true;
    }

    /// Zero length and volume so the next callback prunes this instance
    pub(crate) fn force_complete(&mut self) {
        self.remaining_length = 0;
        self.volume = 0;
    }

    /// Ramp volume down one step; completes the instance at silence
    pub(crate) fn step_fade(&mut self, step: u8) {
        self.volume = self.volume.saturating_sub(step);
        if self.volume == 0 {
            self.remaining_length = 0;
        }
    }

    /// Unplayed samples starting at the cursor
    pub(crate) fn pending(&self) -> &[i16] {
        &self.buffer[self.cursor..self.cursor + self.remaining_length]
    }

    pub(crate) fn advance(&mut self, count: usize) {
        debug_assert!(count <= self.remaining_length);
        self.cursor += count;
        self.remaining_length -= count;
    }

    /// Hand back the buffer if this instance is responsible for releasing it
    pub(crate) fn into_owned_buffer(self) -> Option<SampleBuffer> {
        if self.owns_buffer {
            Some(self.buffer)
        } else {
            None
        }
    }
}
