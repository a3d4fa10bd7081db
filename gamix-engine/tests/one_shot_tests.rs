//! One-shot effect lifecycle through a headless context
//!
//! Covers the concurrency cap, pruning of finished effects and the
//! accounting around dropped requests.

mod helpers;

use gamix_engine::{PlayOutcome, Sound};
use helpers::{headless_context, render_ticks, write_constant_wav};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const MAX_VOLUME: i32 = 128;

fn click(dir: &TempDir, frames: usize, value: i16) -> std::path::PathBuf {
    let path = dir.path().join("click.wav");
    write_constant_wav(&path, frames, value).unwrap();
    path
}

#[test]
fn test_cap_drops_the_twenty_sixth_effect() {
    let dir = TempDir::new().unwrap();
    let path = click(&dir, 100, 100);
    let context = headless_context(25);

    for i in 0..25 {
        assert_eq!(
            context.controller().play_sound(&path, MAX_VOLUME),
            PlayOutcome::Queued,
            "effect {} should be queued",
            i
        );
    }
    assert_eq!(
        context.controller().play_sound(&path, MAX_VOLUME),
        PlayOutcome::CapacityReached
    );

    let snapshot = context.snapshot();
    assert_eq!(snapshot.active_one_shots, 25);
    assert_eq!(snapshot.live_instances, 25);
}

#[test]
fn test_finished_effects_release_the_cap() {
    let dir = TempDir::new().unwrap();
    let path = click(&dir, 100, 100);
    let context = headless_context(25);
    let samples = context.config().samples_per_callback();

    for _ in 0..25 {
        assert!(context.controller().play_sound(&path, MAX_VOLUME).is_queued());
    }

    // All 25 play their 200 samples in the first tick
    let out = render_ticks(&context, 1, samples);
    assert_eq!(out[0], 2500);
    assert_eq!(out[199], 2500);
    assert_eq!(out[200], 0);
    assert_eq!(context.snapshot().live_instances, 25);

    // Exhausted instances are pruned on the next tick
    let out = render_ticks(&context, 1, samples);
    assert!(out.iter().all(|&s| s == 0));
    let snapshot = context.snapshot();
    assert_eq!(snapshot.active_one_shots, 0);
    assert_eq!(snapshot.live_instances, 0);

    assert!(context.controller().play_sound(&path, MAX_VOLUME).is_queued());
}

#[test]
fn test_effect_spanning_ticks_continues_where_it_left_off() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ramp.wav");
    write_constant_wav(&path, 8, 40).unwrap();
    let context = headless_context(4);

    assert!(context.controller().play_sound(&path, 64).is_queued());

    let out = render_ticks(&context, 1, 10);
    assert_eq!(out, vec![20; 10]);
    assert_eq!(context.snapshot().instances[0].cursor, 10);

    let out = render_ticks(&context, 1, 10);
    assert_eq!(&out[..6], &[20; 6]);
    assert_eq!(&out[6..], &[0; 4]);
}

#[test]
fn test_decode_failure_does_not_leak_the_cap() {
    let dir = TempDir::new().unwrap();
    let path = click(&dir, 16, 1);
    let missing = dir.path().join("missing.wav");
    let context = headless_context(2);

    for _ in 0..5 {
        assert_eq!(
            context.controller().play_sound(&missing, MAX_VOLUME),
            PlayOutcome::DecodeFailed
        );
    }
    assert_eq!(context.snapshot().active_one_shots, 0);

    assert!(context.controller().play_sound(&path, MAX_VOLUME).is_queued());
    assert!(context.controller().play_sound(&path, MAX_VOLUME).is_queued());
    assert_eq!(
        context.controller().play_sound(&path, MAX_VOLUME),
        PlayOutcome::CapacityReached
    );
}

#[test]
fn test_garbage_file_is_a_dropped_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("noise.wav");
    std::fs::write(&path, b"definitely not a wav file").unwrap();
    let context = headless_context(4);

    assert_eq!(
        context.controller().play_sound(&path, MAX_VOLUME),
        PlayOutcome::DecodeFailed
    );
    assert_eq!(context.snapshot().live_instances, 0);
}

#[test]
fn test_memory_instances_share_the_template_buffer() {
    let dir = TempDir::new().unwrap();
    let path = click(&dir, 32, 10);
    let context = headless_context(8);

    let template: Sound = context.controller().load(&path, false, MAX_VOLUME).unwrap();
    assert_eq!(template.len(), 64);
    assert_eq!(template.buffer_refs(), 1);

    for _ in 0..3 {
        assert!(context.controller().play_sound_from_memory(&template, 64).is_queued());
    }
    assert_eq!(template.buffer_refs(), 4);
    assert!(context.snapshot().one_shots().all(|i| !i.owns_buffer));

    // Each instance keeps its own cursor and volume
    let out = render_ticks(&context, 1, 16);
    assert_eq!(out, vec![15; 16]);

    // Finished, pruned, then freed by the next control call
    render_ticks(&context, 4, 16);
    assert_eq!(context.snapshot().live_instances, 0);
    assert!(context.controller().play_sound_from_memory(&template, 64).is_queued());
    assert_eq!(template.buffer_refs(), 2);
}

#[test]
fn test_concurrent_requests_never_exceed_the_cap() {
    let dir = TempDir::new().unwrap();
    let path = click(&dir, 64, 1);
    let context = headless_context(25);
    let template = Arc::new(context.controller().load(&path, false, MAX_VOLUME).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let controller = context.controller().clone();
            let template = Arc::clone(&template);
            thread::spawn(move || {
                (0..10)
                    .filter(|_| controller.play_sound_from_memory(&template, MAX_VOLUME).is_queued())
                    .count()
            })
        })
        .collect();

    let queued: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(queued, 25);
    assert_eq!(context.snapshot().active_one_shots, 25);
}
