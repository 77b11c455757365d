//! Surface negotiation and graphics error recovery.

mod common;

use common::Harness;
use tether_shell::{
    ApiTier, Command, DepthFormat, GraphicsStatus, LifecycleState, Multisample, ShellConfig,
    SwapBehavior,
};
use tether_test_utils::{AppEvent, GraphicsCall};

fn created() -> AppEvent {
    AppEvent::SurfaceCreated {
        width: 1080,
        height: 1920,
    }
}

#[test]
fn exhausted_pixel_formats_leave_the_shell_idle() {
    let mut h = Harness::new(ShellConfig::default());
    h.mocks.graphics.set_config_filter(|_| false);

    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    h.pump();
    assert_eq!(h.log.take(), vec![AppEvent::Start]);
    assert_eq!(h.shell.lifecycle_state(), LifecycleState::Created);
    assert!(!h.mocks.graphics.is_display_open());

    // The next window gets a fresh attempt.
    h.mocks.graphics.set_config_filter(|_| true);
    h.send(Command::InitWindow);
    assert_eq!(h.shell.lifecycle_state(), LifecycleState::Animating);
    assert_eq!(h.log.take()[0], created());
}

#[test]
fn pixel_format_relaxes_samples_before_depth() {
    let config = ShellConfig::default()
        .with_depth_format(DepthFormat::Depth24)
        .with_multisample(Multisample::X4);
    let mut h = Harness::new(config);
    h.mocks
        .graphics
        .set_config_filter(|request| request.samples == 0 && request.depth <= 16);

    h.send(Command::InitWindow);
    let attempts: Vec<(u8, u8)> = h
        .mocks
        .graphics
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            GraphicsCall::ChooseConfig(request) => Some((request.depth, request.samples)),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![(24, 4), (24, 2), (24, 0), (16, 0)]);
    assert!(h.shell.surface_state().context_current);
}

#[test]
fn context_tier_falls_back() {
    let mut h = Harness::new(ShellConfig::default());
    h.mocks.graphics.set_max_tier(ApiTier::Gles3);

    h.send(Command::InitWindow);
    let tiers: Vec<ApiTier> = h
        .mocks
        .graphics
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            GraphicsCall::CreateContext(tier) => Some(tier),
            _ => None,
        })
        .collect();
    assert_eq!(tiers, vec![ApiTier::Gles32, ApiTier::Gles31, ApiTier::Gles3]);
    assert_eq!(h.shell.surface_state().tier, ApiTier::Gles3);
    assert_eq!(h.shell.ctx().api_tier(), ApiTier::Gles3);
}

#[test]
fn missing_minor_version_keeps_attempted_tier() {
    let mut h = Harness::new(ShellConfig::default());
    h.mocks.graphics.set_max_tier(ApiTier::Gles31);
    h.mocks.graphics.set_report_minor(false);

    h.send(Command::InitWindow);
    assert_eq!(h.shell.surface_state().tier, ApiTier::Gles31);
}

#[test]
fn swap_behavior_applied_to_new_surfaces() {
    let config = ShellConfig::default().with_swap_behavior(SwapBehavior::BufferPreserved);
    let mut h = Harness::new(config);
    h.send(Command::InitWindow);
    assert_eq!(
        h.mocks.graphics.count(|c| *c == GraphicsCall::SetSwapBehavior(SwapBehavior::BufferPreserved)),
        1
    );
}

#[test]
fn lost_context_on_swap_is_replaced() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();

    h.mocks.graphics.fail_next_swap(GraphicsStatus::ContextLost);
    h.pump();
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Render, AppEvent::SurfaceDestroyed, created()]
    );
    assert_eq!(
        h.mocks
            .graphics
            .count(|c| matches!(c, GraphicsCall::DestroyContext(_))),
        0
    );
    assert_eq!(h.mocks.graphics.live_contexts(), 2);

    h.pump();
    assert_eq!(h.log.take(), vec![AppEvent::Render]);
}

#[test]
fn bad_surface_on_swap_recreates_only_the_surface() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();

    h.mocks.graphics.fail_next_swap(GraphicsStatus::BadSurface);
    h.pump();
    assert_eq!(h.log.take(), vec![AppEvent::Render]);
    let graphics = &h.mocks.graphics;
    assert_eq!(graphics.count(|c| matches!(c, GraphicsCall::DestroySurface(_))), 1);
    assert_eq!(graphics.count(|c| matches!(c, GraphicsCall::CreateSurface(_))), 1);
    assert_eq!(graphics.count(|c| matches!(c, GraphicsCall::CreateContext(_))), 0);
    assert!(h.shell.surface_state().context_current);
}

#[test]
fn unknown_swap_error_reinitializes() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();

    h.mocks.graphics.fail_next_swap(GraphicsStatus::Other(0x300e));
    h.pump();
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Render, AppEvent::SurfaceDestroyed, created()]
    );
    let graphics = &h.mocks.graphics;
    assert_eq!(graphics.count(|c| *c == GraphicsCall::Terminate), 1);
    assert_eq!(graphics.count(|c| *c == GraphicsCall::Initialize), 1);
    assert!(graphics.is_display_open());
    assert_eq!(graphics.live_contexts(), 1);
}

#[test]
fn failed_rebind_on_focus_recovers_before_rendering() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();
    h.send(Command::LostFocus);
    h.clear();

    h.mocks.graphics.fail_next_make_current(GraphicsStatus::BadContext);
    h.send(Command::GainedFocus);
    assert_eq!(
        h.log.take(),
        vec![
            AppEvent::SurfaceDestroyed,
            created(),
            AppEvent::Focus(true),
            AppEvent::Refresh,
            AppEvent::Render,
        ]
    );
    assert!(h.shell.surface_state().context_current);
}

#[test]
fn bad_surface_on_first_bind_still_announces_the_context() {
    let mut h = Harness::new(ShellConfig::default());
    h.mocks
        .graphics
        .fail_next_make_current(GraphicsStatus::BadSurface);

    h.send(Command::InitWindow);
    assert_eq!(
        h.log.take(),
        vec![AppEvent::Start, created(), AppEvent::Refresh, AppEvent::Render]
    );
    let graphics = &h.mocks.graphics;
    assert_eq!(graphics.count(|c| matches!(c, GraphicsCall::CreateSurface(_))), 2);
    assert_eq!(graphics.count(|c| matches!(c, GraphicsCall::CreateContext(_))), 1);
    assert!(h.shell.surface_state().context_current);
}

#[test]
fn failed_reinitialize_stops_rendering() {
    let mut h = Harness::new(ShellConfig::default());
    h.animate();
    h.mocks.graphics.set_config_filter(|_| false);

    h.mocks.graphics.fail_next_swap(GraphicsStatus::Other(0x3001));
    h.pump();
    assert_eq!(h.log.take(), vec![AppEvent::Render, AppEvent::SurfaceDestroyed]);
    assert!(!h.mocks.graphics.is_display_open());
    assert!(!h.shell.surface_state().context_current);

    h.pump();
    assert!(h.log.take().is_empty());
}

#[test]
fn missing_display_never_renders() {
    let mut h = Harness::new(ShellConfig::default());
    h.mocks.graphics.set_display_available(false);

    h.send(Command::InitWindow);
    h.send(Command::GainedFocus);
    assert_eq!(h.log.take(), vec![AppEvent::Start]);
    assert!(!h.shell.surface_state().context_current);
}

enum Step {
    Send(Command),
    FailSwap(GraphicsStatus),
    Pump,
}

#[test]
fn created_and_destroyed_alternate() {
    let mut h = Harness::new(ShellConfig::default());
    let script = [
        Step::Send(Command::InitWindow),
        Step::Send(Command::GainedFocus),
        Step::FailSwap(GraphicsStatus::ContextLost),
        Step::Pump,
        Step::Send(Command::TermWindow),
        Step::Send(Command::InitWindow),
        Step::FailSwap(GraphicsStatus::Other(1)),
        Step::Pump,
        Step::Send(Command::LostFocus),
        Step::Send(Command::Destroy),
    ];
    for step in script {
        match step {
            Step::Send(command) => {
                h.send(command);
            }
            Step::FailSwap(status) => h.mocks.graphics.fail_next_swap(status),
            Step::Pump => {
                h.pump();
            }
        }
    }

    let lifetimes: Vec<bool> = h
        .log
        .events()
        .into_iter()
        .filter_map(|event| match event {
            AppEvent::SurfaceCreated { .. } => Some(true),
            AppEvent::SurfaceDestroyed => Some(false),
            _ => None,
        })
        .collect();
    assert_eq!(lifetimes.len(), 6);
    for (index, created) in lifetimes.iter().enumerate() {
        assert_eq!(*created, index % 2 == 0, "out of order at {index}: {lifetimes:?}");
    }
}
