//! Translation of raw platform key and motion events.
//!
//! Everything here is pure; the shell performs the runtime lookups and the
//! embedder callbacks.

mod key;
mod text;
mod touch;

pub use key::{Key, KeyAction, KeyActions, KeyEventAction, Modifiers, RawKeyEvent, keycode};
pub use text::{FIRST_PRINTABLE, TextInput};
pub use touch::{
    MAX_SIMULTANEOUS_TOUCHES, RawMotionEvent, RawPointer, TouchDispatch, TouchPhase, TouchSlots,
    motion_action,
};

/// A raw key event resolved to a canonical key.
#[derive(Debug, Clone)]
pub struct NormalizedKey {
    pub key: Key,
    pub actions: KeyActions,
    pub modifiers: Modifiers,
    /// A release of the back key, eligible for the background fallback.
    pub is_back_release: bool,
}

#[derive(Debug, Clone)]
pub struct InputNormalizer {
    touch: TouchSlots,
}

impl InputNormalizer {
    pub fn new(multitouch: bool) -> Self {
        Self {
            touch: TouchSlots::new(multitouch),
        }
    }

    pub fn set_multitouch(&mut self, enabled: bool) {
        self.touch.set_multitouch(enabled);
    }

    pub fn multitouch(&self) -> bool {
        self.touch.multitouch()
    }

    /// `None` for unmapped key codes or unknown actions.
    pub fn key(&self, event: &RawKeyEvent) -> Option<NormalizedKey> {
        let key = Key::from_keycode(event.key_code)?;
        let action = KeyEventAction::from_raw(event.action)?;
        Some(NormalizedKey {
            key,
            actions: KeyActions::for_event(action, event.repeat_count),
            modifiers: Modifiers::from_meta_state(event.meta_state),
            is_back_release: key == Key::NavBack && action == KeyEventAction::Up,
        })
    }

    /// How many character callbacks a key event produces once its code point
    /// is known to be printable.
    pub fn text_repeats(&self, event: &RawKeyEvent) -> u32 {
        match KeyEventAction::from_raw(event.action) {
            Some(KeyEventAction::Down) => 1,
            Some(KeyEventAction::Multiple) => u32::try_from(event.repeat_count).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn touches(&self, event: &RawMotionEvent) -> Vec<TouchDispatch> {
        self.touch.normalize(event)
    }
}
