//! Adapters from raw mouse/pointer and touch events to [`GestureEvent`]s.
//!
//! The core gesture logic is written once against the normalized stream;
//! each input modality only needs to say which pointer moved, where, and in
//! which lifecycle phase.

use super::session::{GestureEvent, Phase, PointerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
    Cancel,
}

/// A DOM-style pointer (or legacy mouse) event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub pointer_id: i32,
    pub client_y: f64,
    pub phase: PointerPhase,
}

impl PointerInput {
    pub fn mouse(phase: PointerPhase, client_y: f64) -> Self {
        PointerInput {
            kind: PointerKind::Mouse,
            pointer_id: 1,
            client_y,
            phase,
        }
    }

    pub fn normalize(&self) -> GestureEvent {
        let pointer = match self.kind {
            PointerKind::Mouse => PointerId::Mouse,
            PointerKind::Pen => PointerId::Pen(self.pointer_id),
            PointerKind::Touch => PointerId::Touch(self.pointer_id),
        };
        let phase = match self.phase {
            PointerPhase::Down => Phase::Start,
            PointerPhase::Move => Phase::Move,
            PointerPhase::Up => Phase::End,
            PointerPhase::Leave => Phase::Leave,
            PointerPhase::Cancel => Phase::Cancel,
        };
        GestureEvent::new(pointer, self.client_y, phase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One entry of a touch event's `changedTouches` list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub identifier: i32,
    pub client_y: f64,
}

/// A DOM-style touch event. Only the changed touches matter: each becomes
/// its own gesture event.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub changed: Vec<TouchPoint>,
}

impl TouchInput {
    pub fn new(phase: TouchPhase, changed: Vec<TouchPoint>) -> Self {
        TouchInput { phase, changed }
    }

    pub fn normalize(&self) -> impl Iterator<Item = GestureEvent> + '_ {
        let phase = match self.phase {
            TouchPhase::Start => Phase::Start,
            TouchPhase::Move => Phase::Move,
            TouchPhase::End => Phase::End,
            TouchPhase::Cancel => Phase::Cancel,
        };
        self.changed
            .iter()
            .map(move |t| GestureEvent::new(PointerId::Touch(t.identifier), t.client_y, phase))
    }
}
