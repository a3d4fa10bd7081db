//! Real-time mixer
//!
//! Owns the playback registry and fills one output buffer per device
//! callback. Every access goes through the context's mixer lock, so the
//! callback and control threads never mutate the registry at the same time.
//!
//! # Callback Algorithm
//!
//! 1. Silence the output buffer
//! 2. Walk the registry from the sentinel, keeping a trailing `previous` slot
//! 3. Finished instances: loop tracks that are not fading rewind and keep
//!    playing; everything else is unlinked and retired
//! 4. Fading loop tracks ramp their volume down by the fade step; at zero
//!    they complete and are pruned on the next callback
//! 5. A loop track queued behind an in-progress fade contributes nothing
//! 6. Everything else mixes `min(len, remaining)` samples at its volume
//!
//! # Real-Time Safety
//!
//! `mix` neither allocates nor frees. Pruned instances are moved into a
//! preallocated retirement list and dropped later by the control thread.

use super::crossfade::apply_crossfade_policy;
use super::instance::PlaybackInstance;
use super::registry::{PlaybackRegistry, SlotId, SENTINEL};
use super::types::{InstanceSnapshot, MixerSnapshot};
use crate::audio::types::MAX_VOLUME;
use gamix_common::MixerConfig;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Mixing engine state shared between control threads and the callback
#[derive(Debug)]
pub struct Mixer {
    registry: PlaybackRegistry,
    active_one_shots: usize,
    max_one_shots: usize,
    fade_step: u8,
    retired: Vec<PlaybackInstance>,
    callbacks: u64,
}

impl Mixer {
    pub fn new(config: &MixerConfig) -> Self {
        let capacity = config.pool_capacity();
        debug!(
            "Mixer created: {} slots, one-shot cap {}, fade step {}",
            capacity, config.max_concurrent_one_shots, config.fade_step_per_tick
        );

        Self {
            registry: PlaybackRegistry::with_capacity(capacity),
            active_one_shots: 0,
            max_one_shots: config.max_concurrent_one_shots,
            fade_step: config.fade_step_per_tick,
            retired: Vec::with_capacity(capacity),
            callbacks: 0,
        }
    }

    /// Claim a one-shot slot against the cap
    ///
    /// Returns false when the cap is already reached.
    pub fn reserve_one_shot(&mut self) -> bool {
        if self.active_one_shots >= self.max_one_shots {
            return false;
        }
        self.active_one_shots += 1;
        true
    }

    /// Give back a reservation whose request was dropped
    pub fn cancel_one_shot(&mut self) {
        self.active_one_shots = self.active_one_shots.saturating_sub(1);
    }

    /// Append an instance to the play list
    ///
    /// One-shots must hold a reservation from [`Mixer::reserve_one_shot`].
    /// Loop tracks first run the crossfade policy. When the pool is full the
    /// instance is handed back and nothing else changes; the caller still
    /// owns any one-shot reservation.
    pub fn enqueue(&mut self, instance: PlaybackInstance) -> Result<SlotId, PlaybackInstance> {
        if self.registry.is_full() {
            return Err(instance);
        }

        if instance.is_loop() {
            let outcome = apply_crossfade_policy(&mut self.registry);
            if outcome.fading > 0 {
                debug!(
                    "Crossfade: {} track(s) fading, {} forced out",
                    outcome.fading, outcome.forced
                );
            }
        }

        self.registry.insert(instance)
    }

    /// Fill `out` with the next tick of audio
    ///
    /// `out.len()` is the callback length in interleaved samples.
    pub fn mix(&mut self, out: &mut [i16]) {
        out.fill(0);
        self.callbacks += 1;

        let len = out.len();
        let mut any_fading = false;
        let mut previous = SENTINEL;

        while let Some(current) = self.registry.successor(previous) {
            let Some(instance) = self.registry.get_mut(current) else {
                break;
            };

            if instance.remaining_length() == 0 {
                if instance.is_loop() && !instance.is_fading() {
                    instance.rewind();
                } else {
                    // previous stays put; its new successor is examined next
                    self.prune_after(previous);
                    continue;
                }
            }

            if instance.is_loop() && instance.is_fading() {
                any_fading = true;
                instance.step_fade(self.fade_step);
            }

            let contribution = if any_fading && instance.is_loop() && !instance.is_fading() {
                0
            } else {
                len.min(instance.remaining_length())
            };

            mix_samples(
                &mut out[..contribution],
                &instance.pending()[..contribution],
                instance.volume(),
            );
            instance.advance(contribution);

            previous = current;
        }
    }

    fn prune_after(&mut self, previous: SlotId) {
        let Some(instance) = self.registry.unlink_after(previous) else {
            return;
        };

        if !instance.is_loop() {
            self.active_one_shots = self.active_one_shots.saturating_sub(1);
        }

        // Capacity equals the slot count, so this never reallocates
        if self.retired.len() < self.retired.capacity() {
            self.retired.push(instance);
        }
    }

    /// Move pruned instances out so they can be dropped off the audio thread
    pub fn take_retired(&mut self) -> Vec<PlaybackInstance> {
        self.retired.drain(..).collect()
    }

    /// Unlink every instance and reset the one-shot count
    ///
    /// Returns all instances, including previously retired ones, for the
    /// caller to drop outside the lock.
    pub fn release_all(&mut self) -> Vec<PlaybackInstance> {
        let mut released = self.take_retired();
        self.registry.clear(|instance| released.push(instance));
        self.active_one_shots = 0;
        released
    }

    pub fn active_one_shots(&self) -> usize {
        self.active_one_shots
    }

    pub fn max_one_shots(&self) -> usize {
        self.max_one_shots
    }

    pub fn live_instances(&self) -> usize {
        self.registry.len()
    }

    pub fn callbacks(&self) -> u64 {
        self.callbacks
    }

    /// Instances in play order
    pub fn instances(&self) -> impl Iterator<Item = &PlaybackInstance> {
        self.registry.iter()
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot {
            active_one_shots: self.active_one_shots,
            live_instances: self.registry.len(),
            capacity: self.registry.capacity(),
            callbacks: self.callbacks,
            instances: self.registry.iter().map(InstanceSnapshot::from).collect(),
        }
    }
}

/// Take the mixer lock, recovering the state if a holder panicked
pub(crate) fn lock_mixer(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Add `src` into `dst` at `volume`, saturating at the i16 range
///
/// Samples are scaled by `volume / MAX_VOLUME`. Volume 0 leaves `dst`
/// untouched.
pub fn mix_samples(dst: &mut [i16], src: &[i16], volume: u8) {
    if volume == 0 {
        return;
    }

    let volume = i32::from(volume.min(MAX_VOLUME));
    let max = i32::from(MAX_VOLUME);

    for (out, sample) in dst.iter_mut().zip(src) {
        let scaled = i32::from(*sample) * volume / max;
        *out = (i32::from(*out) + scaled).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
    }
}
