//! AudioContext modes, pause/resume, release and pool limits
//!
//! Everything here runs headless; no audio device is needed.

mod helpers;

use gamix_engine::{AudioContext, Error, MixerConfig, PlayOutcome};
use helpers::{headless_context, render_ticks, write_constant_wav, write_sine_wav};
use tempfile::TempDir;

#[test]
fn test_disabled_context_ignores_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 16, 100).unwrap();

    let mut context = AudioContext::disabled(MixerConfig::default());
    assert!(!context.is_enabled());

    assert_eq!(context.play_from_file(&path, false, 128), PlayOutcome::Disabled);
    assert_eq!(context.play_from_file(&path, true, 128), PlayOutcome::Disabled);

    let mut out = [7i16; 8];
    assert!(!context.render(&mut out));
    assert_eq!(out, [7; 8]);

    context.pause();
    assert!(!context.is_paused());
    assert_eq!(context.release_all(), 0);
    assert_eq!(context.snapshot().live_instances, 0);
    context.shutdown();
}

#[test]
fn test_headless_rejects_invalid_config() {
    let config = MixerConfig {
        callback_buffer_size: 1000,
        ..MixerConfig::default()
    };
    match AudioContext::headless(config) {
        Err(Error::Config(_)) => {}
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_pause_holds_playback_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 32, 100).unwrap();
    let mut context = headless_context(4);

    assert!(context.controller().play_sound(&path, 128).is_queued());
    render_ticks(&context, 1, 16);

    context.pause();
    assert!(context.is_paused());
    let mut out = [1i16; 16];
    assert!(!context.render(&mut out));
    assert_eq!(out, [1; 16]);

    // Requests are still accepted while paused
    assert!(context.controller().play_sound(&path, 128).is_queued());
    assert_eq!(context.snapshot().instances[0].cursor, 16);

    context.resume();
    assert!(!context.is_paused());
    let out = render_ticks(&context, 1, 16);
    assert_eq!(out, vec![200; 16]);
    assert_eq!(context.snapshot().instances[0].cursor, 32);
}

#[test]
fn test_release_all_counts_owned_buffers() {
    let dir = TempDir::new().unwrap();
    let fx = dir.path().join("fx.wav");
    let music = dir.path().join("music.wav");
    write_constant_wav(&fx, 64, 10).unwrap();
    write_sine_wav(&music, 4800, 440.0, 0.5).unwrap();
    let context = headless_context(8);

    let template = context.controller().load(&fx, false, 128).unwrap();
    assert!(context.play_from_memory(&template, false, 128).is_queued());
    assert!(context.play_from_memory(&template, false, 128).is_queued());
    assert!(context.play_from_file(&fx, false, 128).is_queued());
    assert!(context.play_from_file(&fx, false, 128).is_queued());
    assert!(context.controller().play_music(&music, 100).is_queued());
    assert_eq!(template.buffer_refs(), 3);

    assert_eq!(context.release_all(), 3);
    assert_eq!(template.buffer_refs(), 1);

    let snapshot = context.snapshot();
    assert_eq!(snapshot.live_instances, 0);
    assert_eq!(snapshot.active_one_shots, 0);

    // Registry is usable again
    assert!(context.play_from_memory(&template, false, 128).is_queued());
    assert_eq!(context.release_all(), 0);
}

#[test]
fn test_full_pool_drops_requests() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("music.wav");
    write_constant_wav(&path, 64, 10).unwrap();
    let config = MixerConfig {
        max_concurrent_one_shots: 1,
        instance_pool_capacity: Some(2),
        ..MixerConfig::default()
    };
    let context = AudioContext::headless(config).unwrap();

    assert!(context.controller().play_music(&path, 100).is_queued());
    assert!(context.controller().play_music(&path, 100).is_queued());
    assert_eq!(context.controller().play_music(&path, 100), PlayOutcome::PoolExhausted);

    // The one-shot reservation is handed back
    assert_eq!(context.controller().play_sound(&path, 100), PlayOutcome::PoolExhausted);
    assert_eq!(context.snapshot().active_one_shots, 0);

    // Existing playback is untouched by the rejected requests
    let snapshot = context.snapshot();
    assert_eq!(snapshot.live_instances, 2);
    assert!(snapshot.instances[0].fading);
    assert!(!snapshot.instances[1].fading);
}

#[test]
fn test_contexts_are_independent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 16, 100).unwrap();

    let first = headless_context(1);
    let second = headless_context(1);

    assert!(first.controller().play_sound(&path, 128).is_queued());
    assert_eq!(first.controller().play_sound(&path, 128), PlayOutcome::CapacityReached);
    assert!(second.controller().play_sound(&path, 128).is_queued());

    render_ticks(&first, 1, 8);
    assert_eq!(first.snapshot().callbacks, 1);
    assert_eq!(second.snapshot().callbacks, 0);
}

#[test]
fn test_volume_is_clamped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 4, 100).unwrap();
    let context = headless_context(4);

    assert!(context.play_from_file(&path, false, 1000).is_queued());
    assert!(context.play_from_file(&path, false, -20).is_queued());

    let snapshot = context.snapshot();
    assert_eq!(snapshot.instances[0].volume, 128);
    assert_eq!(snapshot.instances[1].volume, 0);

    // A silent instance still plays through and is pruned
    let out = render_ticks(&context, 1, 8);
    assert_eq!(out, vec![100; 8]);
    render_ticks(&context, 1, 8);
    assert_eq!(context.snapshot().live_instances, 0);
}

#[test]
fn test_shutdown_releases_instances() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 16, 100).unwrap();
    let context = headless_context(4);
    let controller = context.controller().clone();

    assert!(controller.play_sound(&path, 128).is_queued());
    context.shutdown();

    assert_eq!(controller.snapshot().live_instances, 0);
}

#[test]
fn test_shutdown_disables_cloned_controllers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fx.wav");
    write_constant_wav(&path, 16, 100).unwrap();
    let context = headless_context(2);
    let controller = context.controller().clone();
    let template = controller.load(&path, false, 128).unwrap();

    context.shutdown();
    assert!(!controller.is_enabled());

    assert_eq!(controller.play_sound(&path, 128), PlayOutcome::Disabled);
    assert_eq!(controller.play_music(&path, 128), PlayOutcome::Disabled);
    assert_eq!(controller.play_sound_from_memory(&template, 128), PlayOutcome::Disabled);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.live_instances, 0);
    assert_eq!(snapshot.active_one_shots, 0);
    assert_eq!(template.buffer_refs(), 1);
}

#[test]
fn test_oversized_pool_is_rejected_without_panicking() {
    let config = MixerConfig {
        instance_pool_capacity: Some(usize::MAX),
        ..MixerConfig::default()
    };

    assert!(matches!(
        AudioContext::headless(config.clone()),
        Err(Error::Config(_))
    ));

    // Validation fails before any device is touched
    let context = AudioContext::init(config.clone());
    assert!(!context.is_enabled());

    let disabled = AudioContext::disabled(config);
    assert_eq!(
        disabled.snapshot().capacity,
        MixerConfig::default().pool_capacity()
    );
}

#[test]
fn test_rejected_request_frees_its_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("music.wav");
    write_constant_wav(&path, 64, 10).unwrap();
    let config = MixerConfig {
        max_concurrent_one_shots: 1,
        instance_pool_capacity: Some(2),
        ..MixerConfig::default()
    };
    let context = AudioContext::headless(config).unwrap();
    let template = context.controller().load(&path, true, 100).unwrap();

    assert!(context.play_from_memory(&template, true, 100).is_queued());
    assert!(context.play_from_memory(&template, true, 100).is_queued());
    assert_eq!(template.buffer_refs(), 3);

    assert_eq!(context.play_from_memory(&template, true, 100), PlayOutcome::PoolExhausted);
    assert_eq!(context.play_from_memory(&template, false, 100), PlayOutcome::PoolExhausted);
    assert_eq!(template.buffer_refs(), 3);
    assert_eq!(context.snapshot().active_one_shots, 0);
}
