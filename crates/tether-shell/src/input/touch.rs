/// Slots available when multitouch is enabled.
pub const MAX_SIMULTANEOUS_TOUCHES: usize = 5;

/// Platform motion action codes.
pub mod motion_action {
    pub const DOWN: i32 = 0;
    pub const UP: i32 = 1;
    pub const MOVE: i32 = 2;
    pub const CANCEL: i32 = 3;
    pub const OUTSIDE: i32 = 4;
    pub const POINTER_DOWN: i32 = 5;
    pub const POINTER_UP: i32 = 6;

    pub const MASK: i32 = 0xff;
    pub const POINTER_INDEX_MASK: i32 = 0xff00;
    pub const POINTER_INDEX_SHIFT: i32 = 8;

    /// Combines an action with the pointer index it applies to.
    pub const fn with_pointer_index(action: i32, index: usize) -> i32 {
        action | ((index as i32) << POINTER_INDEX_SHIFT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

impl TouchPhase {
    /// Phase for a masked action code. Unknown actions yield `None`.
    pub fn from_action(action: i32) -> Option<Self> {
        match action {
            motion_action::DOWN | motion_action::POINTER_DOWN => Some(TouchPhase::Began),
            motion_action::UP | motion_action::POINTER_UP | motion_action::OUTSIDE => {
                Some(TouchPhase::Ended)
            }
            motion_action::MOVE => Some(TouchPhase::Moved),
            motion_action::CANCEL => Some(TouchPhase::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

/// A motion event as posted by the event thread.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMotionEvent {
    pub action: i32,
    pub pointers: Vec<RawPointer>,
}

/// One touch callback invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchDispatch {
    pub slot: usize,
    pub phase: TouchPhase,
    pub x: f64,
    pub y: f64,
}

/// Bounds platform touch identifiers to logical slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSlots {
    max: usize,
}

impl TouchSlots {
    pub fn new(multitouch: bool) -> Self {
        let mut slots = Self { max: 1 };
        slots.set_multitouch(multitouch);
        slots
    }

    pub fn set_multitouch(&mut self, enabled: bool) {
        self.max = if enabled { MAX_SIMULTANEOUS_TOUCHES } else { 1 };
    }

    pub fn multitouch(&self) -> bool {
        self.max > 1
    }

    pub fn slot_for(&self, id: i32) -> Option<usize> {
        usize::try_from(id).ok().filter(|slot| *slot < self.max)
    }

    /// Expands a motion event into per-slot touch callbacks in pointer order.
    pub fn normalize(&self, event: &RawMotionEvent) -> Vec<TouchDispatch> {
        let masked = event.action & motion_action::MASK;
        let Some(phase) = TouchPhase::from_action(masked) else {
            return Vec::new();
        };

        let dispatch = |pointer: &RawPointer| {
            self.slot_for(pointer.id).map(|slot| TouchDispatch {
                slot,
                phase,
                x: pointer.x,
                y: pointer.y,
            })
        };

        if phase == TouchPhase::Moved {
            event.pointers.iter().filter_map(dispatch).collect()
        } else {
            let index = (event.action & motion_action::POINTER_INDEX_MASK)
                >> motion_action::POINTER_INDEX_SHIFT;
            usize::try_from(index)
                .ok()
                .and_then(|index| event.pointers.get(index))
                .and_then(dispatch)
                .into_iter()
                .collect()
        }
    }
}
