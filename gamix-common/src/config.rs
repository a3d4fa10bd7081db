//! Mixer configuration and config file resolution
//!
//! Configuration is fixed at engine initialization. Every field has a
//! built-in default, so a missing file is never fatal.
//!
//! # Resolution Priority
//!
//! 1. Explicit path (command-line argument)
//! 2. `GAMIX_CONFIG` environment variable
//! 3. Platform config file (`~/.config/gamix/config.toml` on Linux)
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GAMIX_CONFIG";

/// Mixing rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Interleave width (2 = stereo)
pub const DEFAULT_CHANNEL_COUNT: u16 = 2;

/// Frames per callback tick; must be a power of two
pub const DEFAULT_CALLBACK_BUFFER_SIZE: u32 = 4096;

/// Max number of one-shot effects mixed at any time
pub const DEFAULT_MAX_CONCURRENT_ONE_SHOTS: usize = 25;

/// Volume decrement per callback while a music track fades out
pub const DEFAULT_FADE_STEP_PER_TICK: u8 = 2;

/// Slots reserved for loop tracks on top of the one-shot cap
pub const LOOP_SLOT_HEADROOM: usize = 8;

/// Upper bound on the one-shot cap
pub const MAX_CONCURRENT_ONE_SHOTS_LIMIT: usize = 1024;

/// Upper bound on registry slots; all of them are allocated at init
pub const MAX_INSTANCE_POOL_CAPACITY: usize = 4096;

/// Engine configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Mixing rate in Hz
    pub sample_rate: u32,

    /// Interleave width
    pub channel_count: u16,

    /// Power-of-two frame count per callback
    pub callback_buffer_size: u32,

    /// One-shot effects cap
    pub max_concurrent_one_shots: usize,

    /// Linear volume decrement per callback during crossfade
    pub fade_step_per_tick: u8,

    /// Total playback slots (one-shots + loop tracks)
    ///
    /// Defaults to `max_concurrent_one_shots + LOOP_SLOT_HEADROOM`.
    pub instance_pool_capacity: Option<usize>,

    /// Output device name (None = default device)
    pub device: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channel_count: DEFAULT_CHANNEL_COUNT,
            callback_buffer_size: DEFAULT_CALLBACK_BUFFER_SIZE,
            max_concurrent_one_shots: DEFAULT_MAX_CONCURRENT_ONE_SHOTS,
            fade_step_per_tick: DEFAULT_FADE_STEP_PER_TICK,
            instance_pool_capacity: None,
            device: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl MixerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MixerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Effective slot count for the playback registry
    pub fn pool_capacity(&self) -> usize {
        self.instance_pool_capacity
            .unwrap_or_else(|| {
                self.max_concurrent_one_shots
                    .checked_add(LOOP_SLOT_HEADROOM)
                    .unwrap_or(usize::MAX)
            })
    }

    /// Samples (not frames) delivered per callback tick
    pub fn samples_per_callback(&self) -> usize {
        self.callback_buffer_size as usize * self.channel_count as usize
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be non-zero".to_string()));
        }
        if self.channel_count == 0 {
            return Err(Error::Config("channel_count must be non-zero".to_string()));
        }
        if !self.callback_buffer_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "callback_buffer_size must be a power of two, got {}",
                self.callback_buffer_size
            )));
        }
        if self.max_concurrent_one_shots == 0 {
            return Err(Error::Config(
                "max_concurrent_one_shots must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_one_shots > MAX_CONCURRENT_ONE_SHOTS_LIMIT {
            return Err(Error::Config(format!(
                "max_concurrent_one_shots must be at most {}, got {}",
                MAX_CONCURRENT_ONE_SHOTS_LIMIT, self.max_concurrent_one_shots
            )));
        }
        if self.pool_capacity() > MAX_INSTANCE_POOL_CAPACITY {
            return Err(Error::Config(format!(
                "instance_pool_capacity must be at most {}, got {}",
                MAX_INSTANCE_POOL_CAPACITY,
                self.pool_capacity()
            )));
        }
        if self.fade_step_per_tick == 0 {
            return Err(Error::Config(
                "fade_step_per_tick must be at least 1".to_string(),
            ));
        }
        // Need room for a full set of effects plus at least one music track
        if self.pool_capacity() <= self.max_concurrent_one_shots {
            return Err(Error::Config(format!(
                "instance_pool_capacity ({}) must exceed max_concurrent_one_shots ({})",
                self.pool_capacity(),
                self.max_concurrent_one_shots
            )));
        }
        Ok(())
    }
}

/// Locates and loads the mixer configuration
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    env_var: String,
    platform_path: Option<PathBuf>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self {
            cli_path: None,
            env_var: CONFIG_ENV_VAR.to_string(),
            platform_path: platform_config_path(),
        }
    }

    /// Explicit path from the command line (highest priority)
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Override the platform config location
    pub fn with_platform_path(mut self, path: Option<PathBuf>) -> Self {
        self.platform_path = path;
        self
    }

    /// Resolve the configuration following the priority order
    ///
    /// Explicitly named files (CLI or environment) must load. The platform
    /// file is optional.
    pub fn resolve(&self) -> Result<MixerConfig> {
        if let Some(path) = &self.cli_path {
            info!("Loading config from command line path: {}", path.display());
            return MixerConfig::from_file(path);
        }

        if let Ok(path) = std::env::var(&self.env_var) {
            let path = PathBuf::from(path);
            info!("Loading config from {}: {}", self.env_var, path.display());
            return MixerConfig::from_file(&path);
        }

        if let Some(path) = &self.platform_path {
            if path.exists() {
                info!("Loading config from {}", path.display());
                return MixerConfig::from_file(path);
            }
            debug!("No config file at {}, using defaults", path.display());
        }

        Ok(MixerConfig::default())
    }
}

/// Default configuration file path for the platform
fn platform_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gamix").join("config.toml"))
}
