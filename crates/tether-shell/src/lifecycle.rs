use crate::config::LifecyclePolicy;

/// Coarse application state driven by lifecycle commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Created,
    /// A window and surface exist but focus is not held.
    WindowReady,
    /// Window ready and focused; the render loop is running.
    Animating,
    /// Focus or the window was lost after having been ready.
    Paused,
    Destroyed,
}

/// Reported whenever the animating flag flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationChange {
    pub animating: bool,
    /// Whether the embedder's focus callback should see this transition.
    pub notify_focus: bool,
}

/// Pure lifecycle state machine. Side effects are left to the shell.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    window_ready: bool,
    focused: bool,
    has_activated: bool,
    policy: LifecyclePolicy,
}

impl Lifecycle {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self {
            state: LifecycleState::Created,
            window_ready: false,
            focused: false,
            has_activated: false,
            policy,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == LifecycleState::Animating
    }

    pub fn is_window_ready(&self) -> bool {
        self.window_ready
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == LifecycleState::Destroyed
    }

    /// The surface came up on a freshly attached window.
    pub fn window_ready(&mut self) -> Option<AnimationChange> {
        if self.is_destroyed() {
            return None;
        }
        self.window_ready = true;
        if !self.focused {
            self.state = LifecycleState::WindowReady;
        }
        self.settle()
    }

    /// The window was terminated. Animation stops regardless of focus.
    pub fn window_terminated(&mut self) -> Option<AnimationChange> {
        if self.is_destroyed() {
            return None;
        }
        self.window_ready = false;
        self.settle()
    }

    /// Focus is recorded even without a window; animation starts once both
    /// are present.
    pub fn focus_gained(&mut self) -> Option<AnimationChange> {
        if self.is_destroyed() {
            return None;
        }
        self.focused = true;
        self.settle()
    }

    pub fn focus_lost(&mut self) -> Option<AnimationChange> {
        if self.is_destroyed() {
            return None;
        }
        self.focused = false;
        self.settle()
    }

    pub fn destroyed(&mut self) -> Option<AnimationChange> {
        let was_animating = self.is_animating();
        self.state = LifecycleState::Destroyed;
        self.window_ready = false;
        self.focused = false;
        was_animating.then(|| self.change(false))
    }

    /// Starts over in `Created` for a re-entered session. The first-focus
    /// flag survives so re-entry reports focus normally.
    pub fn reset(&mut self) {
        self.state = LifecycleState::Created;
        self.window_ready = false;
        self.focused = false;
    }

    fn settle(&mut self) -> Option<AnimationChange> {
        let was_animating = self.is_animating();
        let animating = self.window_ready && self.focused;

        if animating {
            self.state = LifecycleState::Animating;
        } else if was_animating || (!self.window_ready && self.state == LifecycleState::WindowReady)
        {
            self.state = LifecycleState::Paused;
        }

        (animating != was_animating).then(|| self.change(animating))
    }

    fn change(&mut self, animating: bool) -> AnimationChange {
        let notify_focus = if animating && !self.has_activated {
            self.has_activated = true;
            self.policy.report_initial_focus
        } else {
            true
        };
        AnimationChange {
            animating,
            notify_focus,
        }
    }
}
