//! Frame pacing when the embedder does not present.

mod common;

use std::time::Duration;

use common::Harness;
use tether_core::geometry::Bounds;
use tether_shell::{Command, ShellConfig};
use tether_test_utils::{BridgeCall, RecordingApp};

fn without_swap() -> Harness {
    let (app, log) = RecordingApp::new();
    Harness::with_app(app.with_swap_on_render(false), log, ShellConfig::default())
}

#[test]
fn swapping_frames_are_never_paced() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();
    for _ in 0..4 {
        h.pump();
    }
    assert!(h.mocks.clock.sleeps().is_empty());
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::RefreshRate), 0);
}

#[test]
fn unswapped_frames_sleep_toward_the_refresh_interval() {
    let mut h = without_swap();
    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    for _ in 0..3 {
        h.pump();
    }

    let sleeps = h.mocks.clock.sleeps();
    assert_eq!(sleeps.len(), 4);
    let interval = Duration::from_secs_f64(1.0 / 60.0);
    for sleep in sleeps {
        assert!(sleep < interval, "slept {sleep:?}");
        assert!(sleep > interval / 2, "slept {sleep:?}");
    }
    // Queried once, then cached.
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::RefreshRate), 1);
}

#[test]
fn rotation_requeries_the_refresh_rate() {
    let mut h = without_swap();
    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::RefreshRate), 1);

    h.mocks.bridge.set_rotation(Some(1));
    h.content_rect(Bounds::new(0, 0, 1080, 1920));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::RefreshRate), 2);

    // Same rotation again keeps the cached rate.
    h.content_rect(Bounds::new(0, 0, 1080, 1920));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::RefreshRate), 2);
}

#[test]
fn faster_displays_get_shorter_frames() {
    let mut h = without_swap();
    h.mocks.bridge.set_refresh_rate(Some(120.0));
    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    h.pump();

    let interval = Duration::from_secs_f64(1.0 / 120.0);
    let sleeps = h.mocks.clock.sleeps();
    assert!(!sleeps.is_empty());
    assert!(sleeps.iter().all(|sleep| *sleep < interval));
}

#[test]
fn failed_refresh_rate_query_defaults_to_sixty() {
    let mut h = without_swap();
    h.mocks.bridge.set_refresh_rate(None);
    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    h.pump();

    let before = h.mocks.clock.peek();
    h.pump();
    let frame = h.mocks.clock.peek() - before;
    let interval = Duration::from_secs_f64(1.0 / 60.0);
    assert!(frame >= interval - Duration::from_millis(1), "frame took {frame:?}");
    assert!(frame <= interval + Duration::from_millis(1), "frame took {frame:?}");
}

#[test]
fn paused_shell_does_not_pace() {
    let mut h = without_swap();
    h.send(Command::InitWindow);
    h.pump();
    h.pump();
    assert!(h.mocks.clock.sleeps().is_empty());
}

#[test]
fn frame_time_counts_renders() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();
    let before = h.shell.ctx().frame_time().frame_count;
    h.pump();
    h.pump();
    let ctx = h.shell.ctx();
    assert_eq!(ctx.frame_time().frame_count, before + 2);
    assert!(ctx.frame_time().delta > Duration::ZERO);
}
