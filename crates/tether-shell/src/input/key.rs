use bitflags::bitflags;

/// Platform key codes the shell recognizes.
pub mod keycode {
    pub const BACK: i32 = 4;
    pub const NUM_0: i32 = 7;
    pub const NUM_9: i32 = 16;
    pub const DPAD_UP: i32 = 19;
    pub const DPAD_DOWN: i32 = 20;
    pub const DPAD_LEFT: i32 = 21;
    pub const DPAD_RIGHT: i32 = 22;
    pub const DPAD_CENTER: i32 = 23;
    pub const A: i32 = 29;
    pub const Z: i32 = 54;
    pub const TAB: i32 = 61;
    pub const SPACE: i32 = 62;
    pub const ENTER: i32 = 66;
    pub const MENU: i32 = 82;
}

/// Canonical key identity delivered to the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
    Tab,
    Space,
    NavBack,
    NavMenu,
    /// `'0'..='9'` or `'A'..='Z'`.
    Alphanumeric(char),
}

impl Key {
    pub fn from_keycode(code: i32) -> Option<Key> {
        let key = match code {
            keycode::DPAD_LEFT => Key::Left,
            keycode::DPAD_RIGHT => Key::Right,
            keycode::DPAD_UP => Key::Up,
            keycode::DPAD_DOWN => Key::Down,
            keycode::ENTER | keycode::DPAD_CENTER => Key::Enter,
            keycode::TAB => Key::Tab,
            keycode::SPACE => Key::Space,
            keycode::BACK => Key::NavBack,
            keycode::MENU => Key::NavMenu,
            keycode::NUM_0..=keycode::NUM_9 => offset_char(b'0', code - keycode::NUM_0)?,
            keycode::A..=keycode::Z => offset_char(b'A', code - keycode::A)?,
            _ => return None,
        };
        Some(key)
    }
}

fn offset_char(base: u8, offset: i32) -> Option<Key> {
    let offset = u8::try_from(offset).ok()?;
    Some(Key::Alphanumeric(char::from(base + offset)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Pressed,
    Repeated,
    Released,
}

/// Action field of a platform key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventAction {
    Down,
    Up,
    /// A burst of identical events collapsed into one.
    Multiple,
}

impl KeyEventAction {
    pub fn from_raw(action: i32) -> Option<Self> {
        match action {
            0 => Some(KeyEventAction::Down),
            1 => Some(KeyEventAction::Up),
            2 => Some(KeyEventAction::Multiple),
            _ => None,
        }
    }

    pub const fn raw(self) -> i32 {
        match self {
            KeyEventAction::Down => 0,
            KeyEventAction::Up => 1,
            KeyEventAction::Multiple => 2,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
    }
}

impl Modifiers {
    const META_SHIFT_ON: i32 = 0x1;
    const META_ALT_ON: i32 = 0x2;
    const META_CTRL_ON: i32 = 0x1000;
    const META_META_ON: i32 = 0x10000;

    /// Decodes the platform meta state bit field.
    pub fn from_meta_state(meta: i32) -> Self {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::SHIFT, meta & Self::META_SHIFT_ON != 0);
        modifiers.set(Modifiers::ALT, meta & Self::META_ALT_ON != 0);
        modifiers.set(Modifiers::CTRL, meta & Self::META_CTRL_ON != 0);
        modifiers.set(Modifiers::META, meta & Self::META_META_ON != 0);
        modifiers
    }
}

/// A key event as posted by the event thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKeyEvent {
    pub key_code: i32,
    pub action: i32,
    pub repeat_count: i32,
    pub meta_state: i32,
}

impl RawKeyEvent {
    pub fn new(key_code: i32, action: KeyEventAction) -> Self {
        Self {
            key_code,
            action: action.raw(),
            repeat_count: 0,
            meta_state: 0,
        }
    }

    pub fn with_repeat_count(mut self, repeat_count: i32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn with_meta_state(mut self, meta_state: i32) -> Self {
        self.meta_state = meta_state;
        self
    }
}

/// The embedder-facing actions produced by one raw key event.
#[derive(Debug, Clone)]
pub struct KeyActions {
    single: Option<KeyAction>,
    pairs_left: u32,
    release_next: bool,
}

impl KeyActions {
    pub fn for_event(action: KeyEventAction, repeat_count: i32) -> Self {
        let repeats = u32::try_from(repeat_count).unwrap_or(0);
        match action {
            KeyEventAction::Up => Self::single(KeyAction::Released),
            KeyEventAction::Down if repeats > 0 => Self::single(KeyAction::Repeated),
            KeyEventAction::Down => Self::single(KeyAction::Pressed),
            KeyEventAction::Multiple => Self {
                single: None,
                pairs_left: repeats,
                release_next: false,
            },
        }
    }

    fn single(action: KeyAction) -> Self {
        Self {
            single: Some(action),
            pairs_left: 0,
            release_next: false,
        }
    }
}

impl Iterator for KeyActions {
    type Item = KeyAction;

    fn next(&mut self) -> Option<KeyAction> {
        if let Some(action) = self.single.take() {
            return Some(action);
        }
        if self.release_next {
            self.release_next = false;
            self.pairs_left -= 1;
            return Some(KeyAction::Released);
        }
        if self.pairs_left > 0 {
            self.release_next = true;
            return Some(KeyAction::Pressed);
        }
        None
    }
}
