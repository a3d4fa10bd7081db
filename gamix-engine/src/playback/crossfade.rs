//! Music crossfade policy
//!
//! Runs when a new loop track is about to be appended. At most one loop
//! track plays at full volume; the one it replaces fades out and anything
//! queued between them is dropped, so the newest request wins.

use super::registry::PlaybackRegistry;

/// What the policy did to the existing loop tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossfadeOutcome {
    /// Tracks newly marked to fade out
    pub fading: usize,
    /// Tracks zeroed so the next callback prunes them
    pub forced: usize,
}

/// Mark the current loop tracks to fade ahead of a new one
///
/// In play order: a loop track that is not fading starts fading. If a fade
/// is already in flight when such a track is met, that track would become a
/// second concurrent fade, so it is forced to completion instead (length and
/// volume zeroed). One-shot effects are left alone.
pub fn apply_crossfade_policy(registry: &mut PlaybackRegistry) -> CrossfadeOutcome {
    let mut outcome = CrossfadeOutcome::default();
    let mut fade_in_flight = false;

    registry.for_each_mut(|instance| {
        if !instance.is_loop() {
            return;
        }

        if instance.is_fading() {
            fade_in_flight = true;
            return;
        }

        if fade_in_flight {
            instance.force_complete();
            outcome.forced += 1;
        }
        instance.begin_fade();
        outcome.fading += 1;
    });

    outcome
}
