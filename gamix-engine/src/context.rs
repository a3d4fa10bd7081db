//! Audio context: one mixer plus the device driving it
//!
//! Each context is an independent engine. Nothing is process-global, so
//! several mixers can coexist and tests can build one without hardware.
//!
//! # Construction Modes
//!
//! - [`AudioContext::init`]: open the device; on failure the context is
//!   disabled and every request becomes a silent no-op
//! - [`AudioContext::try_init`]: same, but the failure is returned
//! - [`AudioContext::headless`]: no device; the caller drives ticks with
//!   [`AudioContext::render`]
//! - [`AudioContext::disabled`]: never plays anything

use crate::audio::decode::SoundLoader;
use crate::audio::output::AudioOutput;
use crate::audio::types::FormatSpec;
use crate::error::Result;
use crate::playback::controller::PlaybackController;
use crate::playback::instance::Sound;
use crate::playback::mixer::Mixer;
use crate::playback::types::{MixerSnapshot, PlayOutcome};
use gamix_common::MixerConfig;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Mixer, control handle and (optionally) the output device
pub struct AudioContext {
    config: MixerConfig,
    controller: PlaybackController,
    output: Option<AudioOutput>,
    paused: bool,
}

impl AudioContext {
    /// Open the audio device and start mixing
    ///
    /// Never fails: if the device cannot be opened the error is logged and a
    /// disabled context is returned.
    pub fn init(config: MixerConfig) -> Self {
        match Self::try_init(config.clone()) {
            Ok(context) => context,
            Err(e) => {
                error!("Audio initialization failed, audio disabled: {}", e);
                Self::disabled(config)
            }
        }
    }

    /// Open the audio device and start mixing, reporting failures
    pub fn try_init(config: MixerConfig) -> Result<Self> {
        config.validate()?;

        let mixer = Arc::new(Mutex::new(Mixer::new(&config)));
        let mut output = AudioOutput::open(&config)?;
        output.start(Arc::clone(&mixer))?;

        info!(
            "Audio initialized on '{}' ({} Hz, {} channels, {} frames per callback)",
            output.device_name(),
            output.sample_rate(),
            output.channels(),
            output.buffer_size()
        );

        let controller = PlaybackController::new(mixer, Self::loader(&config), true);
        Ok(Self {
            config,
            controller,
            output: Some(output),
            paused: false,
        })
    }

    /// Enabled context without a device
    pub fn headless(config: MixerConfig) -> Result<Self> {
        config.validate()?;

        let mixer = Arc::new(Mutex::new(Mixer::new(&config)));
        let controller = PlaybackController::new(mixer, Self::loader(&config), true);
        Ok(Self {
            config,
            controller,
            output: None,
            paused: false,
        })
    }

    /// Context that ignores every request
    ///
    /// Accepts any configuration; an invalid one only sizes the idle mixer
    /// from the defaults.
    pub fn disabled(config: MixerConfig) -> Self {
        let mixer = match config.validate() {
            Ok(()) => Mixer::new(&config),
            Err(_) => Mixer::new(&MixerConfig::default()),
        };
        let mixer = Arc::new(Mutex::new(mixer));
        let controller = PlaybackController::new(mixer, Self::loader(&config), false);
        Self {
            config,
            controller,
            output: None,
            paused: false,
        }
    }

    fn loader(config: &MixerConfig) -> SoundLoader {
        SoundLoader::new(FormatSpec::from_config(config))
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.controller.is_enabled()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Name of the open output device, if any
    pub fn device_name(&self) -> Option<String> {
        self.output.as_ref().map(AudioOutput::device_name)
    }

    /// True once the device reported a stream error
    pub fn has_device_error(&self) -> bool {
        self.output.as_ref().is_some_and(AudioOutput::has_error)
    }

    /// Stream errors reported since the last [`AudioContext::clear_device_error`]
    pub fn device_error_count(&self) -> u32 {
        self.output.as_ref().map_or(0, AudioOutput::error_count)
    }

    /// Acknowledge reported stream errors
    pub fn clear_device_error(&self) {
        if let Some(output) = &self.output {
            output.clear_error();
        }
    }

    /// Cloneable handle for other threads
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn play_from_file<P: AsRef<Path>>(&self, path: P, looping: bool, volume: i32) -> PlayOutcome {
        self.controller.play_from_file(path, looping, volume)
    }

    pub fn play_from_memory(&self, template: &Sound, looping: bool, volume: i32) -> PlayOutcome {
        self.controller.play_from_memory(template, looping, volume)
    }

    /// Free every playing instance; returns the owned buffers released
    pub fn release_all(&self) -> usize {
        self.controller.release_all()
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        self.controller.snapshot()
    }

    /// Stop the device from invoking the mixer
    ///
    /// Playing instances keep their state and continue on resume.
    pub fn pause(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if let Some(output) = &self.output {
            if let Err(e) = output.pause() {
                warn!("Pause failed: {}", e);
                return;
            }
        }
        self.paused = true;
        info!("Audio paused");
    }

    pub fn resume(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if let Some(output) = &self.output {
            if let Err(e) = output.resume() {
                warn!("Resume failed: {}", e);
                return;
            }
        }
        self.paused = false;
        info!("Audio resumed");
    }

    /// Mix one tick into `out` on a headless context
    ///
    /// Returns false and leaves `out` untouched when the context is
    /// disabled, paused, or owned by a device.
    pub fn render(&self, out: &mut [i16]) -> bool {
        if !self.is_enabled() || self.paused || self.output.is_some() {
            return false;
        }
        self.controller.render(out);
        true
    }

    /// Pause, release every instance and close the device
    ///
    /// Controller clones held elsewhere report `Disabled` from then on.
    pub fn shutdown(mut self) {
        if !self.is_enabled() {
            return;
        }

        self.pause();
        self.controller.disable();
        let released = self.release_all();

        if let Some(mut output) = self.output.take() {
            if let Err(e) = output.close() {
                warn!("Closing audio device failed: {}", e);
            }
        }

        info!("Audio shut down ({} owned buffer(s) released)", released);
    }
}
