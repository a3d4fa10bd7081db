//! Error types for gamix-engine
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//!
//! Most mixing failures are not errors at all: dropped play requests are
//! reported through [`crate::playback::PlayOutcome`]. These types cover
//! decoding, device setup and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for gamix-engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] gamix_common::Error),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures turning a WAV file into a playable sound
#[derive(Error, Debug)]
pub enum DecodeError {
    /// File does not exist or cannot be opened
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Container or codec not supported
    #[error("Unsupported audio in {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    /// Corrupt or truncated data
    #[error("Malformed audio in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// File decoded to zero samples
    #[error("No audio samples in {path}")]
    Empty { path: PathBuf },
}

/// Convenience Result type using gamix-engine Error
pub type Result<T> = std::result::Result<T, Error>;
