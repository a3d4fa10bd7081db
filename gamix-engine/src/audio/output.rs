//! Audio output using cpal
//!
//! Opens the output device and drives the mixer from the device callback.
//! The callback holds the mixer lock for the whole tick, which is what
//! keeps control-thread mutations and mixing from interleaving.

use crate::error::{Error, Result};
use crate::playback::mixer::{lock_mixer, Mixer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use gamix_common::MixerConfig;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Device sample formats we can feed, in order of preference
const PREFERRED_FORMATS: [SampleFormat; 3] = [SampleFormat::I16, SampleFormat::F32, SampleFormat::U16];

/// Opened output device and its playback stream
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    /// Set by the stream error callback
    error_flag: Arc<AtomicBool>,
    error_count: Arc<AtomicU32>,
}

impl AudioOutput {
    /// List available audio output devices
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open the configured output device
    ///
    /// Falls back to the default device when the named one is missing. The
    /// device must support the configured rate and channel count directly.
    pub fn open(mixer_config: &MixerConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = match mixer_config.device.as_ref() {
            Some(name) => {
                let mut devices = host
                    .output_devices()
                    .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;

                match devices.find(|d| d.name().ok().as_ref() == Some(name)) {
                    Some(dev) => {
                        info!("Found requested audio device: {}", name);
                        dev
                    }
                    None => {
                        warn!("Requested device '{}' not found, falling back to default device", name);
                        host.default_output_device().ok_or_else(|| {
                            Error::AudioOutput(format!(
                                "Device '{}' not found and no default device available",
                                name
                            ))
                        })?
                    }
                }
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?,
        };

        let (config, sample_format) = Self::select_config(&device, mixer_config)?;

        info!(
            "Audio device '{}': sample_rate={}, channels={}, format={:?}, buffer_size={:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0,
            config.channels,
            sample_format,
            config.buffer_size
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            error_flag: Arc::new(AtomicBool::new(false)),
            error_count: Arc::new(AtomicU32::new(0)),
        })
    }

    /// Find a supported configuration matching the mixer format exactly
    fn select_config(device: &Device, mixer_config: &MixerConfig) -> Result<(StreamConfig, SampleFormat)> {
        let supported: Vec<_> = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?
            .filter(|c| {
                c.channels() == mixer_config.channel_count
                    && c.min_sample_rate().0 <= mixer_config.sample_rate
                    && c.max_sample_rate().0 >= mixer_config.sample_rate
            })
            .collect();

        let sample_format = PREFERRED_FORMATS
            .iter()
            .copied()
            .find(|format| supported.iter().any(|c| c.sample_format() == *format))
            .ok_or_else(|| {
                Error::AudioOutput(format!(
                    "Device supports no {} Hz / {} channel output in i16, f32 or u16",
                    mixer_config.sample_rate, mixer_config.channel_count
                ))
            })?;

        let config = StreamConfig {
            channels: mixer_config.channel_count,
            sample_rate: cpal::SampleRate(mixer_config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(mixer_config.callback_buffer_size),
        };

        Ok((config, sample_format))
    }

    /// Start the stream, mixing on every device callback
    ///
    /// The callback runs on the real-time audio thread. It only takes the
    /// mixer lock, mixes and converts; no logging.
    pub fn start(&mut self, mixer: Arc<Mutex<Mixer>>) -> Result<()> {
        info!("Starting audio stream");

        let stream = match self.sample_format {
            SampleFormat::I16 => self.build_stream::<i16>(mixer)?,
            SampleFormat::F32 => self.build_stream::<f32>(mixer)?,
            SampleFormat::U16 => self.build_stream::<u16>(mixer)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);

        info!("Audio stream started successfully");
        Ok(())
    }

    /// Build a stream that mixes into an i16 scratch buffer and converts
    fn build_stream<T>(&self, mixer: Arc<Mutex<Mixer>>) -> Result<Stream>
    where
        T: SizedSample + FromSample<i16>,
    {
        let error_flag = Arc::clone(&self.error_flag);
        let error_count = Arc::clone(&self.error_count);
        let mut scratch = vec![0i16; self.buffer_size() as usize * self.config.channels as usize];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // Only grows if the host hands over more than it negotiated
                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0);
                    }
                    let mixed = &mut scratch[..data.len()];

                    lock_mixer(&mixer).mix(mixed);

                    for (out, sample) in data.iter_mut().zip(mixed.iter()) {
                        *out = T::from_sample(*sample);
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                    error_count.fetch_add(1, Ordering::SeqCst);
                },
                None, // No timeout
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }

    /// Stop invoking the callback
    pub fn pause(&self) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }
        Ok(())
    }

    /// Resume invoking the callback
    pub fn resume(&self) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|e| Error::AudioOutput(format!("Failed to resume stream: {}", e)))?;
        }
        Ok(())
    }

    /// Pause and drop the stream
    pub fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            info!("Closing audio stream");
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        }
        Ok(())
    }

    pub fn device_name(&self) -> String {
        self.device
            .name()
            .unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Frames per callback
    pub fn buffer_size(&self) -> u32 {
        match &self.config.buffer_size {
            cpal::BufferSize::Fixed(size) => *size,
            // Only Fixed is ever requested; use a typical host size for scratch sizing
            cpal::BufferSize::Default => 512,
        }
    }

    /// True once the stream error callback has fired
    pub fn has_error(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::SeqCst)
    }

    pub fn clear_error(&self) {
        self.error_flag.store(false, Ordering::SeqCst);
        self.error_count.store(0, Ordering::SeqCst);
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
