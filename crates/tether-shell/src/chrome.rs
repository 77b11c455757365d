//! Resize debouncing, orientation, soft keyboard and inset tracking.

use tether_core::geometry::{Bounds, Insets, Size};

use crate::config::ChromeMode;
use crate::surface::SurfaceState;

/// Frames an unconfirmed surface size change may wait for a content rect
/// change before it is reported anyway.
pub const RESIZE_EVENT_MAX_WAIT_FRAMES: u32 = 5;

/// Smallest band, in density-independent units, taken to be a keyboard.
pub const MINIMUM_KEYBOARD_SIZE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    /// Maps a display rotation in quarter turns.
    pub fn from_rotation(rotation: i32) -> Self {
        match rotation {
            0 => Orientation::Portrait,
            1 => Orientation::LandscapeRight,
            2 => Orientation::PortraitUpsideDown,
            3 => Orientation::LandscapeLeft,
            _ => Orientation::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardState {
    pub visible: bool,
    pub frame: Bounds,
}

/// Finds the band of the window hidden by the soft keyboard.
///
/// The region between the window and its visible frame splits into four
/// bands; the largest one at least [`MINIMUM_KEYBOARD_SIZE`] in both
/// dimensions wins.
pub fn keyboard_frame(window: Bounds, visible: Bounds, scale: f64) -> Option<Bounds> {
    let min = (MINIMUM_KEYBOARD_SIZE * scale) as i32;
    let bands = [
        Bounds::new(window.left, window.top, visible.left, window.bottom),
        Bounds::new(visible.right, window.top, window.right, window.bottom),
        Bounds::new(window.left, window.top, window.right, visible.top),
        Bounds::new(window.left, visible.bottom, window.right, window.bottom),
    ];
    bands
        .into_iter()
        .filter(|band| band.width() >= min && band.height() >= min && band.area() > 0)
        .max_by_key(Bounds::area)
}

/// Where chrome insets are read from, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetSource {
    DisplayCutout,
    SystemWindow,
    VisibleFrame,
}

pub fn inset_priority(chrome: ChromeMode) -> &'static [InsetSource] {
    match chrome {
        ChromeMode::Fullscreen => &[InsetSource::DisplayCutout, InsetSource::VisibleFrame],
        ChromeMode::Navigation | ChromeMode::NavigationAndStatusBar => {
            &[InsetSource::SystemWindow, InsetSource::VisibleFrame]
        }
    }
}

/// Insets implied by the visible frame inside a window of `size` pixels.
pub fn insets_from_visible_frame(visible: Bounds, size: Size<u32>) -> Insets {
    if visible.is_empty() {
        return Insets::ZERO;
    }
    Insets::new(
        f64::from(visible.top),
        f64::from(size.width) - f64::from(visible.right),
        f64::from(size.height) - f64::from(visible.bottom),
        f64::from(visible.left),
    )
}

#[derive(Debug, Clone, Default)]
pub struct ChromeTracker {
    orientation: Orientation,
    keyboard: KeyboardState,
}

impl ChromeTracker {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            keyboard: KeyboardState::default(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn keyboard(&self) -> KeyboardState {
        self.keyboard
    }

    /// Decides whether a live surface size should be reported now.
    ///
    /// Unforced changes are held for up to [`RESIZE_EVENT_MAX_WAIT_FRAMES`]
    /// frames. Returns the new size once it is committed to `state`.
    pub fn check_resize(
        state: &mut SurfaceState,
        live: Size<u32>,
        force: bool,
    ) -> Option<Size<u32>> {
        if live == state.size() {
            return None;
        }
        if force || state.resize_wait_frames == 0 {
            state.resize_wait_frames = RESIZE_EVENT_MAX_WAIT_FRAMES;
            state.width = live.width;
            state.height = live.height;
            Some(live)
        } else {
            state.resize_wait_frames -= 1;
            None
        }
    }

    /// Returns the new orientation if it differs from the cached one.
    pub fn update_orientation(&mut self, orientation: Orientation) -> Option<Orientation> {
        if orientation == self.orientation {
            return None;
        }
        self.orientation = orientation;
        Some(orientation)
    }

    /// Returns the new keyboard state if visibility or frame changed.
    pub fn update_keyboard(
        &mut self,
        window: Bounds,
        visible: Bounds,
        scale: f64,
    ) -> Option<KeyboardState> {
        let frame = keyboard_frame(window, visible, scale);
        let next = KeyboardState {
            visible: frame.is_some(),
            frame: frame.unwrap_or(Bounds::ZERO),
        };
        if next == self.keyboard {
            return None;
        }
        self.keyboard = next;
        Some(next)
    }
}
