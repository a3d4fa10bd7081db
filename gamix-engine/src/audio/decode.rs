//! WAV loading using symphonia
//!
//! Turns a file path into a fully decoded [`Sound`]. Decoding happens on the
//! calling (control) thread, never on the audio callback.
//!
//! # Sample Format
//!
//! - Output: interleaved i16 in the file's own channel layout
//! - No resampling or channel conversion: a file whose rate or channel
//!   count differs from the device format is accepted with a warning

use crate::audio::types::FormatSpec;
use crate::error::DecodeError;
use crate::playback::instance::Sound;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer as PcmBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decodes WAV files into playable sounds in the device format
#[derive(Debug, Clone, Copy)]
pub struct SoundLoader {
    spec: FormatSpec,
}

impl SoundLoader {
    /// Loader producing sounds tagged with the device format
    pub fn new(spec: FormatSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> FormatSpec {
        self.spec
    }

    /// Decode a whole file into memory
    ///
    /// # Errors
    /// - [`DecodeError::FileNotFound`] when the file cannot be opened
    /// - [`DecodeError::Unsupported`] when it is not a PCM WAV file
    /// - [`DecodeError::Malformed`] when decoding fails part way
    /// - [`DecodeError::Empty`] when the file holds no samples
    pub fn load<P: AsRef<Path>>(
        &self,
        path: P,
        looping: bool,
        volume: i32,
    ) -> Result<Sound, DecodeError> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|_| DecodeError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let unsupported = |reason: String| DecodeError::Unsupported {
            path: path.to_path_buf(),
            reason,
        };
        let malformed = |reason: String| DecodeError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| unsupported(e.to_string()))?;
        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| unsupported("no audio track found".to_string()))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| unsupported(e.to_string()))?;

        if let Some(rate) = codec_params.sample_rate {
            if rate != self.spec.frequency {
                warn!(
                    "{}: sample rate {} Hz differs from device {} Hz, playing unconverted",
                    path.display(),
                    rate,
                    self.spec.frequency
                );
            }
        }
        if let Some(channels) = codec_params.channels.map(|c| c.count()) {
            if channels != self.spec.channels as usize {
                warn!(
                    "{}: {} channel(s) differs from device {}, playing unconverted",
                    path.display(),
                    channels,
                    self.spec.channels
                );
            }
        }

        let mut samples: Vec<i16> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break; // EOF
                }
                Err(e) => return Err(malformed(e.to_string())),
            };

            // Skip packets from other tracks
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("{}: skipping corrupt packet: {}", path.display(), e);
                    continue;
                }
                Err(e) => return Err(malformed(e.to_string())),
            };

            let mut pcm = PcmBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
            pcm.copy_interleaved_ref(decoded);
            samples.extend_from_slice(pcm.samples());
        }

        if samples.is_empty() {
            return Err(DecodeError::Empty {
                path: path.to_path_buf(),
            });
        }

        debug!(
            "Decoded {}: {} samples, loop={}",
            path.display(),
            samples.len(),
            looping
        );

        Ok(Sound::new(self.spec, samples, looping, volume))
    }
}
