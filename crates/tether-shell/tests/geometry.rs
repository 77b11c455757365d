//! Resize debouncing, content rect rendezvous, keyboard and inset tracking.

mod common;

use common::Harness;
use tether_core::geometry::{Bounds, Insets, Rect, Size};
use tether_shell::{ChromeMode, ColorFormat, Command, Orientation, ShellConfig};
use tether_test_utils::{AppEvent, BridgeCall, MockPlatform, RecordingApp};

#[test]
fn unconfirmed_resize_waits_five_frames() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();
    h.mocks.graphics.set_surface_size(1920, 1080);
    h.mocks.bridge.set_rotation(Some(1));

    for _ in 0..5 {
        h.pump();
    }
    assert_eq!(h.log.take(), vec![AppEvent::Render; 5]);
    assert_eq!(h.shell.ctx().display_size(), Size::new(1080, 1920));

    h.pump();
    assert_eq!(
        h.log.take(),
        vec![
            AppEvent::Orientation(Orientation::LandscapeRight),
            AppEvent::Resized {
                width: 1920,
                height: 1080,
            },
            AppEvent::Refresh,
            AppEvent::Render,
        ]
    );
    assert_eq!(h.shell.ctx().display_size(), Size::new(1920, 1080));
    assert_eq!(h.shell.ctx().orientation(), Orientation::LandscapeRight);

    h.pump();
    assert_eq!(h.log.take(), vec![AppEvent::Render]);
}

#[test]
fn content_rect_change_reports_resize_immediately() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);
    h.clear();

    let window = Bounds::new(0, 0, 1920, 1080);
    h.mocks.graphics.set_surface_size(1920, 1080);
    h.mocks.bridge.set_visible_frame(Some(window));

    assert_eq!(h.content_rect(window), Some(window));
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Resized {
            width: 1920,
            height: 1080,
        }]
    );
    assert_eq!(h.shell.ctx().content_rect(), window);
    assert_eq!(
        h.mocks.bridge.count(|c| *c == BridgeCall::ResetContentRect),
        1
    );
}

#[test]
fn back_to_back_content_rects_each_see_their_own_value() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);

    let first = Bounds::new(0, 0, 1080, 1920);
    let second = Bounds::new(0, 0, 1080, 1200);
    let sender = h.sender.clone();
    let shell = &mut h.shell;
    let (a, b) = std::thread::scope(|scope| {
        let one = scope.spawn(|| sender.set_content_rect(first));
        let two = scope.spawn(|| sender.set_content_rect(second));
        while !(one.is_finished() && two.is_finished()) {
            shell.pump();
            std::thread::yield_now();
        }
        (
            one.join().expect("publisher panicked"),
            two.join().expect("publisher panicked"),
        )
    });

    assert_eq!(a, Some(first));
    assert_eq!(b, Some(second));
    let last = h.shell.ctx().content_rect();
    assert!(last == first || last == second);
}

#[test]
fn keyboard_band_reported_on_change_only() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);
    h.clear();

    let window = Bounds::new(0, 0, 1000, 2000);
    h.mocks
        .bridge
        .set_visible_frame(Some(Bounds::new(0, 0, 1000, 1500)));
    h.content_rect(window);
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Keyboard {
            visible: true,
            frame: Rect::new(0.0, 1500.0, 1000.0, 500.0),
        }]
    );
    assert!(h.shell.ctx().is_keyboard_visible());
    assert_eq!(
        h.shell.ctx().keyboard().frame,
        Bounds::new(0, 1500, 1000, 2000)
    );

    h.content_rect(window);
    assert!(h.log.take().is_empty());

    h.mocks.bridge.set_visible_frame(Some(window));
    h.content_rect(window);
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Keyboard {
            visible: false,
            frame: Bounds::ZERO.to_rect(),
        }]
    );
}

#[test]
fn keyboard_threshold_scales_with_density() {
    let mocks = MockPlatform::new();
    mocks.window.set_density(Some(320));
    let (app, log) = RecordingApp::new();
    let mut h = Harness::with_mocks(app, log, ShellConfig::default(), mocks);
    h.send(Command::InitWindow);
    assert_eq!(h.shell.ctx().scale(), 2.0);
    h.clear();

    // 150 pixels is under 100 units at 2x.
    h.mocks
        .bridge
        .set_visible_frame(Some(Bounds::new(0, 0, 1000, 1850)));
    h.content_rect(Bounds::new(0, 0, 1000, 2000));
    assert!(h.log.take().is_empty());
    assert!(!h.shell.ctx().is_keyboard_visible());
}

#[test]
fn failed_visible_frame_query_means_no_keyboard() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);
    h.clear();

    h.content_rect(Bounds::new(0, 0, 1080, 1920));
    assert!(h.log.take().is_empty());
    assert!(h.mocks.bridge.calls().contains(&BridgeCall::VisibleDisplayFrame));
}

#[test]
fn rotation_reported_once_per_change() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);
    assert_eq!(h.shell.ctx().orientation(), Orientation::Portrait);
    h.clear();

    let window = Bounds::new(0, 0, 1080, 1920);
    h.mocks.bridge.set_visible_frame(Some(window));
    h.mocks.bridge.set_rotation(Some(3));
    h.content_rect(window);
    h.content_rect(window);
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Orientation(Orientation::LandscapeLeft)]
    );

    // A failing query keeps the cached orientation.
    h.mocks.bridge.set_rotation(None);
    h.content_rect(window);
    assert!(h.log.take().is_empty());
    assert_eq!(h.shell.ctx().orientation(), Orientation::LandscapeLeft);
}

#[test]
fn window_setup_on_attach() {
    let config = ShellConfig::default()
        .with_color_format(ColorFormat::Rgb565)
        .with_chrome(ChromeMode::Fullscreen);
    let mut h = Harness::new(config);
    h.send(Command::InitWindow);

    assert_eq!(h.mocks.window.format(), Some(ColorFormat::Rgb565));
    assert_eq!(h.mocks.window.fullscreen(), Some(true));
    assert_eq!(h.mocks.window.buffers_format(), Some(1));
    assert!(h
        .mocks
        .bridge
        .calls()
        .contains(&BridgeCall::SetChrome(ChromeMode::Fullscreen)));
}

#[test]
fn insets_prefer_system_window_outside_fullscreen() {
    let mut h = Harness::new(ShellConfig::default());
    h.send(Command::InitWindow);
    h.clear();

    let system = Insets::new(24.0, 0.0, 48.0, 0.0);
    h.mocks.bridge.set_system_window_insets(Some(system));
    h.mocks
        .bridge
        .set_cutout_insets(Some(Insets::new(80.0, 0.0, 0.0, 0.0)));
    assert_eq!(h.shell.ctx().chrome_insets(), system);
    assert_eq!(h.mocks.bridge.calls(), vec![BridgeCall::SystemWindowInsets]);
}

#[test]
fn fullscreen_insets_prefer_cutout_then_visible_frame() {
    let config = ShellConfig::default().with_chrome(ChromeMode::Fullscreen);
    let mut h = Harness::new(config);
    h.send(Command::InitWindow);
    h.clear();

    let cutout = Insets::new(80.0, 0.0, 0.0, 0.0);
    h.mocks.bridge.set_cutout_insets(Some(cutout));
    assert_eq!(h.shell.ctx().chrome_insets(), cutout);

    h.mocks.bridge.set_cutout_insets(None);
    h.mocks
        .bridge
        .set_visible_frame(Some(Bounds::new(0, 50, 1080, 1800)));
    assert_eq!(
        h.shell.ctx().chrome_insets(),
        Insets::new(50.0, 0.0, 120.0, 0.0)
    );
    assert_eq!(
        h.mocks.bridge.count(|c| *c == BridgeCall::SystemWindowInsets),
        0
    );

    h.mocks.bridge.set_visible_frame(None);
    assert_eq!(h.shell.ctx().chrome_insets(), Insets::ZERO);
}

#[test]
fn showing_keyboard_leaves_fullscreen() {
    let config = ShellConfig::default().with_chrome(ChromeMode::Fullscreen);
    let mut h = Harness::new(config);
    h.pump();
    h.clear();

    h.shell.ctx().set_keyboard_visible(true);
    assert_eq!(
        h.mocks.bridge.calls(),
        vec![
            BridgeCall::SetSoftKeyboardVisible(true),
            BridgeCall::SetChrome(ChromeMode::NavigationAndStatusBar),
        ]
    );
    assert_eq!(h.shell.ctx().chrome(), ChromeMode::NavigationAndStatusBar);
}

#[test]
fn failed_keyboard_request_keeps_chrome() {
    let config = ShellConfig::default().with_chrome(ChromeMode::Fullscreen);
    let mut h = Harness::new(config);
    h.pump();
    h.mocks.bridge.set_soft_keyboard_available(false);

    h.shell.ctx().set_keyboard_visible(true);
    assert_eq!(h.shell.ctx().chrome(), ChromeMode::Fullscreen);
}
