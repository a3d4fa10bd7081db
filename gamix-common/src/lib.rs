//! # gamix Common Library
//!
//! Shared code for the gamix mixing engine and its tools:
//! - Mixer configuration model and defaults
//! - Configuration file resolution
//! - Common error type

pub mod config;
pub mod error;

pub use config::{ConfigResolver, LoggingConfig, MixerConfig};
pub use error::{Error, Result};
