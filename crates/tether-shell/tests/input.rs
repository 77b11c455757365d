//! Key, text and touch delivery.

mod common;

use common::Harness;
use tether_shell::input::{KeyEventAction, keycode, motion_action};
use tether_shell::{
    Key, KeyAction, LifecyclePolicy, Modifiers, RawKeyEvent, RawMotionEvent, RawPointer,
    ShellConfig, TouchPhase,
};
use tether_test_utils::{AppEvent, BridgeCall, RecordingApp};

/// A shell that has attached but has no window, so only input is logged.
fn idle(config: ShellConfig) -> Harness {
    let mut h = Harness::new(config);
    h.pump();
    h.clear();
    h
}

fn key(key: Key, action: KeyAction, modifiers: Modifiers) -> AppEvent {
    AppEvent::Key {
        key,
        action,
        modifiers,
    }
}

fn text(text: &str, modifiers: Modifiers) -> AppEvent {
    AppEvent::Char {
        text: text.to_string(),
        modifiers,
    }
}

fn motion(action: i32, pointers: &[(i32, f64)]) -> RawMotionEvent {
    RawMotionEvent {
        action,
        pointers: pointers
            .iter()
            .map(|&(id, x)| RawPointer { id, x, y: x + 1.0 })
            .collect(),
    }
}

#[test]
fn press_repeat_and_release() {
    let mut h = idle(ShellConfig::default());
    h.sender
        .post_key(RawKeyEvent::new(keycode::DPAD_LEFT, KeyEventAction::Down));
    h.sender.post_key(
        RawKeyEvent::new(keycode::DPAD_LEFT, KeyEventAction::Down).with_repeat_count(1),
    );
    h.sender
        .post_key(RawKeyEvent::new(keycode::DPAD_LEFT, KeyEventAction::Up));
    h.pump();

    let none = Modifiers::empty();
    assert_eq!(
        h.log.take(),
        vec![
            key(Key::Left, KeyAction::Pressed, none),
            key(Key::Left, KeyAction::Repeated, none),
            key(Key::Left, KeyAction::Released, none),
        ]
    );
}

#[test]
fn multiple_action_expands_to_pairs_and_text() {
    let mut h = idle(ShellConfig::default());
    h.mocks.bridge.set_unicode(keycode::A, u32::from('a'));
    h.sender.post_key(
        RawKeyEvent::new(keycode::A, KeyEventAction::Multiple).with_repeat_count(2),
    );
    h.pump();

    let none = Modifiers::empty();
    let a = Key::Alphanumeric('A');
    assert_eq!(
        h.log.take(),
        vec![
            key(a, KeyAction::Pressed, none),
            key(a, KeyAction::Released, none),
            key(a, KeyAction::Pressed, none),
            key(a, KeyAction::Released, none),
            text("a", none),
            text("a", none),
        ]
    );
}

#[test]
fn supplementary_plane_text_is_four_bytes() {
    let mut h = idle(ShellConfig::default());
    h.mocks.bridge.set_unicode(keycode::A, 0x1F600);
    h.sender.post_key(
        RawKeyEvent::new(keycode::A, KeyEventAction::Down).with_meta_state(0x1),
    );
    h.pump();

    let events = h.log.take();
    assert_eq!(
        events,
        vec![
            key(Key::Alphanumeric('A'), KeyAction::Pressed, Modifiers::SHIFT),
            text("\u{1F600}", Modifiers::SHIFT),
        ]
    );
    let AppEvent::Char { text: typed, .. } = &events[1] else {
        panic!("expected text, got {:?}", events[1]);
    };
    assert_eq!(typed.as_bytes(), &[0xF0, 0x9F, 0x98, 0x80]);
    assert!(h.mocks.bridge.calls().contains(&BridgeCall::UnicodeChar {
        key_code: keycode::A,
        meta_state: 0x1,
    }));
}

#[test]
fn control_characters_and_release_produce_no_text() {
    let mut h = idle(ShellConfig::default());
    h.mocks.bridge.set_unicode(keycode::ENTER, 0x0A);
    h.sender
        .post_key(RawKeyEvent::new(keycode::ENTER, KeyEventAction::Down));
    h.sender
        .post_key(RawKeyEvent::new(keycode::ENTER, KeyEventAction::Up));
    h.pump();

    assert!(!h
        .log
        .events()
        .iter()
        .any(|event| matches!(event, AppEvent::Char { .. })));
    // Only the press asks for a code point.
    assert_eq!(
        h.mocks
            .bridge
            .count(|c| matches!(c, BridgeCall::UnicodeChar { .. })),
        1
    );
}

#[test]
fn unmapped_keys_still_type() {
    let mut h = idle(ShellConfig::default());
    h.mocks.bridge.set_unicode(200, u32::from('é'));
    h.sender.post_key(RawKeyEvent::new(200, KeyEventAction::Down));
    h.pump();

    assert_eq!(h.log.take(), vec![text("é", Modifiers::empty())]);
}

#[test]
fn unhandled_back_release_moves_task_to_background() {
    let mut h = idle(ShellConfig::default());
    h.sender
        .post_key(RawKeyEvent::new(keycode::BACK, KeyEventAction::Down));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::MoveTaskToBack), 0);

    h.sender
        .post_key(RawKeyEvent::new(keycode::BACK, KeyEventAction::Up));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::MoveTaskToBack), 1);
    assert_eq!(
        h.log.events().last(),
        Some(&key(Key::NavBack, KeyAction::Released, Modifiers::empty()))
    );
}

#[test]
fn handled_back_release_stays_in_foreground() {
    let (app, log) = RecordingApp::new();
    let mut h = Harness::with_app(app.with_key_handling(true), log, ShellConfig::default());
    h.pump();
    h.sender
        .post_key(RawKeyEvent::new(keycode::BACK, KeyEventAction::Up));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::MoveTaskToBack), 0);
}

#[test]
fn background_on_back_can_be_disabled() {
    let policy = LifecyclePolicy {
        background_on_back: false,
        ..Default::default()
    };
    let mut h = idle(ShellConfig::default().with_policy(policy));
    h.sender
        .post_key(RawKeyEvent::new(keycode::BACK, KeyEventAction::Up));
    h.pump();
    assert_eq!(h.mocks.bridge.count(|c| *c == BridgeCall::MoveTaskToBack), 0);
}

#[test]
fn single_touch_only_uses_slot_zero() {
    let mut h = idle(ShellConfig::default());
    assert!(!h.shell.ctx().multitouch_enabled());

    h.sender
        .post_motion(motion(motion_action::DOWN, &[(0, 10.0)]));
    h.sender.post_motion(motion(
        motion_action::with_pointer_index(motion_action::POINTER_DOWN, 1),
        &[(0, 10.0), (1, 30.0)],
    ));
    h.sender
        .post_motion(motion(motion_action::MOVE, &[(0, 12.0), (1, 32.0)]));
    h.pump();

    assert_eq!(
        h.log.take(),
        vec![
            AppEvent::Touch {
                slot: 0,
                phase: TouchPhase::Began,
                x: 10.0,
                y: 11.0,
            },
            AppEvent::Touch {
                slot: 0,
                phase: TouchPhase::Moved,
                x: 12.0,
                y: 13.0,
            },
        ]
    );
}

#[test]
fn multitouch_delivers_each_pointer_in_order() {
    let mut h = idle(ShellConfig::default());
    h.shell.ctx().set_multitouch_enabled(true);

    h.sender.post_motion(motion(
        motion_action::MOVE,
        &[(0, 1.0), (1, 2.0), (7, 3.0), (4, 4.0)],
    ));
    h.sender.post_motion(motion(
        motion_action::with_pointer_index(motion_action::POINTER_UP, 1),
        &[(0, 1.0), (1, 2.0)],
    ));
    h.sender.post_motion(motion(motion_action::CANCEL, &[(0, 1.0)]));
    h.pump();

    let touches: Vec<(usize, TouchPhase)> = h
        .log
        .take()
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::Touch { slot, phase, .. } => Some((slot, phase)),
            _ => None,
        })
        .collect();
    assert_eq!(
        touches,
        vec![
            (0, TouchPhase::Moved),
            (1, TouchPhase::Moved),
            (4, TouchPhase::Moved),
            (1, TouchPhase::Ended),
            (0, TouchPhase::Cancelled),
        ]
    );
}

#[test]
fn unknown_motion_actions_are_dropped() {
    let mut h = idle(ShellConfig::default().with_multitouch(true));
    h.sender.post_motion(motion(9, &[(0, 1.0)]));
    h.pump();
    assert!(h.log.take().is_empty());
}
