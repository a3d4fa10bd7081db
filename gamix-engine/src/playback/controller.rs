//! Playback control API
//!
//! [`PlaybackController`] is the handle gameplay and UI threads use to start
//! sounds. It is cheap to clone and `Send + Sync`; every registry mutation
//! happens under the mixer lock, which the device callback also holds while
//! mixing.
//!
//! Requests are never errors. Each play call reports a [`PlayOutcome`] and
//! dropped requests leave existing playback untouched.

use super::instance::{PlaybackInstance, Sound};
use super::mixer::{lock_mixer, Mixer};
use super::types::{MixerSnapshot, PlayOutcome};
use crate::audio::decode::SoundLoader;
use crate::audio::types::clamp_volume;
use crate::error::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Where a play request takes its audio from
#[derive(Debug, Clone, Copy)]
pub enum PlaySource<'a> {
    /// Decode this file; the instance owns the result
    File(&'a Path),
    /// Share an already decoded template
    Memory(&'a Sound),
}

/// Thread-safe handle for issuing play requests
///
/// Clones share the enabled flag, so shutting the context down disables
/// every handle.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    mixer: Arc<Mutex<Mixer>>,
    loader: SoundLoader,
    enabled: Arc<AtomicBool>,
}

impl PlaybackController {
    pub(crate) fn new(mixer: Arc<Mutex<Mixer>>, loader: SoundLoader, enabled: bool) -> Self {
        Self {
            mixer,
            loader,
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// False when the audio device could not be initialized or the context
    /// has shut down
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Turn every clone of this handle into a no-op
    pub(crate) fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Decode a reusable template for [`PlaybackController::play_from_memory`]
    pub fn load<P: AsRef<Path>>(&self, path: P, looping: bool, volume: i32) -> Result<Sound> {
        Ok(self.loader.load(path, looping, volume)?)
    }

    /// Start playback of a file or template
    ///
    /// One-shots (`looping == false`) count against the concurrency cap and
    /// are dropped once it is reached. Loop tracks are uncapped and trigger
    /// the crossfade policy.
    pub fn play(&self, source: PlaySource<'_>, looping: bool, volume: i32) -> PlayOutcome {
        if !self.is_enabled() {
            debug!("Audio disabled, ignoring play request");
            return PlayOutcome::Disabled;
        }

        if !looping && !self.lock().reserve_one_shot() {
            debug!("One-shot cap reached, dropping request");
            return PlayOutcome::CapacityReached;
        }

        let volume = clamp_volume(volume);
        let instance = match source {
            PlaySource::File(path) => match self.loader.load(path, looping, volume.into()) {
                Ok(sound) => PlaybackInstance::owned(sound),
                Err(e) => {
                    warn!("Dropping play request: {}", e);
                    if !looping {
                        self.lock().cancel_one_shot();
                    }
                    return PlayOutcome::DecodeFailed;
                }
            },
            PlaySource::Memory(template) => PlaybackInstance::shared(template, looping, volume),
        };

        let (outcome, retired, rejected) = {
            let mut mixer = self.lock();
            let retired = mixer.take_retired();

            // Re-checked under the lock so nothing lands after a shutdown
            let (outcome, rejected) = if !self.is_enabled() {
                (PlayOutcome::Disabled, Some(instance))
            } else {
                match mixer.enqueue(instance) {
                    Ok(_) => (PlayOutcome::Queued, None),
                    Err(rejected) => (PlayOutcome::PoolExhausted, Some(rejected)),
                }
            };
            if rejected.is_some() && !looping {
                mixer.cancel_one_shot();
            }
            (outcome, retired, rejected)
        };

        // Freed here, off the audio thread and outside the lock
        drop(retired);
        drop(rejected);

        if outcome == PlayOutcome::PoolExhausted {
            warn!("No free playback slot, dropping request");
        }
        outcome
    }

    /// Decode `path` and play it
    pub fn play_from_file<P: AsRef<Path>>(&self, path: P, looping: bool, volume: i32) -> PlayOutcome {
        self.play(PlaySource::File(path.as_ref()), looping, volume)
    }

    /// Play a pre-decoded template without copying its samples
    pub fn play_from_memory(&self, template: &Sound, looping: bool, volume: i32) -> PlayOutcome {
        self.play(PlaySource::Memory(template), looping, volume)
    }

    /// One-shot effect from a file
    pub fn play_sound<P: AsRef<Path>>(&self, path: P, volume: i32) -> PlayOutcome {
        self.play_from_file(path, false, volume)
    }

    /// Looping music track from a file
    pub fn play_music<P: AsRef<Path>>(&self, path: P, volume: i32) -> PlayOutcome {
        self.play_from_file(path, true, volume)
    }

    pub fn play_sound_from_memory(&self, template: &Sound, volume: i32) -> PlayOutcome {
        self.play_from_memory(template, false, volume)
    }

    pub fn play_music_from_memory(&self, template: &Sound, volume: i32) -> PlayOutcome {
        self.play_from_memory(template, true, volume)
    }

    /// Stop and free every playing instance
    ///
    /// Returns how many owned decoded buffers were released. Instances that
    /// share a template's buffer never count.
    pub fn release_all(&self) -> usize {
        let released = self.lock().release_all();

        let total = released.len();
        let owned = released
            .into_iter()
            .filter_map(PlaybackInstance::into_owned_buffer)
            .count();

        if total > 0 {
            info!("Released {} playback instance(s), {} owned buffer(s)", total, owned);
        }
        owned
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        self.lock().snapshot()
    }

    /// Run one callback tick by hand
    pub(crate) fn render(&self, out: &mut [i16]) {
        self.lock().mix(out);
    }

    fn lock(&self) -> MutexGuard<'_, Mixer> {
        lock_mixer(&self.mixer)
    }
}
