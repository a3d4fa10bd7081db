//! Shared types for playback control

use super::instance::PlaybackInstance;

/// Result of a play request
///
/// Dropped requests are a capacity or availability policy, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PlayOutcome {
    /// Instance appended to the registry
    Queued,

    /// Audio device unavailable; request ignored
    Disabled,

    /// One-shot cap reached; request dropped
    CapacityReached,

    /// Source file missing or unreadable; request dropped
    DecodeFailed,

    /// No free registry slot; request dropped
    PoolExhausted,
}

impl PlayOutcome {
    pub fn is_queued(self) -> bool {
        self == PlayOutcome::Queued
    }
}

/// Point-in-time view of one playing instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSnapshot {
    pub looping: bool,
    pub fading: bool,
    pub volume: u8,
    pub cursor: usize,
    pub remaining_length: usize,
    pub total_length: usize,
    pub owns_buffer: bool,
}

impl From<&PlaybackInstance> for InstanceSnapshot {
    fn from(instance: &PlaybackInstance) -> Self {
        Self {
            looping: instance.is_loop(),
            fading: instance.is_fading(),
            volume: instance.volume(),
            cursor: instance.cursor(),
            remaining_length: instance.remaining_length(),
            total_length: instance.total_length(),
            owns_buffer: instance.owns_buffer(),
        }
    }
}

/// Point-in-time view of the mixer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixerSnapshot {
    /// One-shot effects counted against the cap
    pub active_one_shots: usize,

    /// Registry slots in use
    pub live_instances: usize,

    /// Registry slots in total
    pub capacity: usize,

    /// Callbacks mixed so far
    pub callbacks: u64,

    /// Instances in play order
    pub instances: Vec<InstanceSnapshot>,
}

impl MixerSnapshot {
    /// Loop tracks currently in the registry
    pub fn loop_tracks(&self) -> impl Iterator<Item = &InstanceSnapshot> {
        self.instances.iter().filter(|i| i.looping)
    }

    /// One-shot effects currently in the registry
    pub fn one_shots(&self) -> impl Iterator<Item = &InstanceSnapshot> {
        self.instances.iter().filter(|i| !i.looping)
    }
}
