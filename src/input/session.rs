//! Drag sessions: the lifetime of one continuous gesture on one control.
//!
//! A [`DragTracker`] holds at most one live session per control. Ending a
//! session flips its `active` flag before anything else, so move events that
//! race with listener removal are dropped instead of applied.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::mapper::{ControlKind, round_value};

/// Identity of a control on the mixer surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Volume fader of a stem.
    Fader(String),
    /// Delay-feedback knob of a stem.
    DelayKnob(String),
    /// The global varispeed fader.
    Varispeed,
}

impl ControlId {
    /// Parse the string form used by the web surface:
    /// `fader:<LABEL>`, `delay:<LABEL>` or `varispeed`.
    pub fn parse(s: &str) -> Option<Self> {
        if s == "varispeed" {
            return Some(ControlId::Varispeed);
        }
        let (kind, label) = s.split_once(':')?;
        if label.is_empty() {
            return None;
        }
        match kind {
            "fader" => Some(ControlId::Fader(label.to_string())),
            "delay" => Some(ControlId::DelayKnob(label.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlId::Fader(label) => write!(f, "fader:{label}"),
            ControlId::DelayKnob(label) => write!(f, "delay:{label}"),
            ControlId::Varispeed => write!(f, "varispeed"),
        }
    }
}

/// Which physical pointer drives a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Pen(i32),
    Touch(i32),
}

/// Lifecycle phase of a normalized gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Move,
    End,
    /// Pointer left the tracked target while window listeners were installed.
    Leave,
    Cancel,
}

/// One normalized input sample: `(pointer, axis value, phase)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub pointer: PointerId,
    /// Vertical screen coordinate in pixels.
    pub axis: f64,
    pub phase: Phase,
}

impl GestureEvent {
    pub fn new(pointer: PointerId, axis: f64, phase: Phase) -> Self {
        GestureEvent {
            pointer,
            axis,
            phase,
        }
    }
}

/// How successive move events are referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Every move is measured from the gesture's start position and start value.
    Absolute,
    /// Every move is measured from the previous sample; the running value is
    /// clamped at each step and kept at full precision.
    Relative,
}

/// Scoped registration of the window-level listeners a drag needs.
///
/// The release callback runs exactly once: on [`ListenerLease::release`] or on drop.
pub struct ListenerLease {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerLease {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        ListenerLease {
            release: Some(Box::new(release)),
        }
    }

    /// A lease with nothing to release (hosts that route events without
    /// installing listeners).
    pub fn none() -> Self {
        ListenerLease { release: None }
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_held(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerLease")
            .field("held", &self.is_held())
            .finish()
    }
}

/// State of one in-progress gesture.
#[derive(Debug)]
pub struct DragSession {
    control: ControlId,
    pointer: PointerId,
    kind: ControlKind,
    mode: ReferenceMode,
    start_position: f64,
    start_value: f64,
    last_position: f64,
    /// Full-precision running value (relative mode).
    running_value: f64,
    active: bool,
    lease: ListenerLease,
}

impl DragSession {
    pub fn new(
        control: ControlId,
        pointer: PointerId,
        kind: ControlKind,
        mode: ReferenceMode,
        position: f64,
        value: f64,
        lease: ListenerLease,
    ) -> Self {
        DragSession {
            control,
            pointer,
            kind,
            mode,
            start_position: position,
            start_value: value,
            last_position: position,
            running_value: value,
            active: true,
            lease,
        }
    }

    pub fn control(&self) -> &ControlId {
        &self.control
    }

    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    pub fn start_value(&self) -> f64 {
        self.start_value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply a move sample. Returns the rounded value to report, or `None` if
    /// the session is no longer active or the pointer does not own it.
    pub fn update(&mut self, pointer: PointerId, position: f64) -> Option<f64> {
        if !self.active || pointer != self.pointer {
            return None;
        }
        let value = match self.mode {
            ReferenceMode::Absolute => self.kind.apply(self.start_value, position - self.start_position),
            ReferenceMode::Relative => {
                let next = self.kind.apply(self.running_value, position - self.last_position);
                self.last_position = position;
                self.running_value = next;
                next
            }
        };
        Some(round_value(value))
    }

    /// Deactivate and release listeners. Idempotent.
    pub fn finish(&mut self) {
        self.active = false;
        self.lease.release();
    }
}

impl Drop for DragSession {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Registry of live drag sessions, at most one per control.
#[derive(Debug, Default)]
pub struct DragTracker {
    sessions: HashMap<ControlId, DragSession>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session. Refused (returns `false`, lease released) if the
    /// control is already being dragged.
    pub fn begin(
        &mut self,
        control: ControlId,
        pointer: PointerId,
        kind: ControlKind,
        mode: ReferenceMode,
        position: f64,
        value: f64,
        lease: ListenerLease,
    ) -> bool {
        if self.is_dragging(&control) {
            debug!("ignoring second drag on {control} from {pointer:?}");
            return false;
        }
        debug!("drag start on {control} from {pointer:?} at {position}");
        let session = DragSession::new(control.clone(), pointer, kind, mode, position, value, lease);
        self.sessions.insert(control, session);
        true
    }

    /// Feed a move sample to the control's session.
    pub fn update(&mut self, control: &ControlId, pointer: PointerId, position: f64) -> Option<f64> {
        self.sessions.get_mut(control)?.update(pointer, position)
    }

    /// End the control's session if `pointer` owns it. Returns whether a
    /// session ended.
    pub fn end(&mut self, control: &ControlId, pointer: PointerId) -> bool {
        match self.sessions.get(control) {
            Some(session) if session.pointer() == pointer => {}
            _ => return false,
        }
        if let Some(mut session) = self.sessions.remove(control) {
            session.finish();
            debug!("drag end on {control}");
        }
        true
    }

    pub fn is_dragging(&self, control: &ControlId) -> bool {
        self.sessions.get(control).is_some_and(DragSession::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Tear down every session (component teardown).
    pub fn cancel_all(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.finish();
        }
    }
}

impl Drop for DragTracker {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_lease(counter: &Rc<Cell<u32>>) -> ListenerLease {
        let counter = Rc::clone(counter);
        ListenerLease::new(move || counter.set(counter.get() + 1))
    }

    fn fader() -> ControlId {
        ControlId::Fader("DRUMS".into())
    }

    #[test]
    fn parse_control_ids() {
        assert_eq!(ControlId::parse("fader:BASS"), Some(ControlId::Fader("BASS".into())));
        assert_eq!(ControlId::parse("delay:VOCALS"), Some(ControlId::DelayKnob("VOCALS".into())));
        assert_eq!(ControlId::parse("varispeed"), Some(ControlId::Varispeed));
        assert_eq!(ControlId::parse("fader:"), None);
        assert_eq!(ControlId::parse("knob:BASS"), None);
        assert_eq!(ControlId::Fader("BASS".into()).to_string(), "fader:BASS");
    }

    #[test]
    fn absolute_session_measures_from_start() {
        let mut session = DragSession::new(
            fader(),
            PointerId::Mouse,
            ControlKind::Fader { resistance: 100.0 },
            ReferenceMode::Absolute,
            200.0,
            0.5,
            ListenerLease::none(),
        );
        assert_eq!(session.update(PointerId::Mouse, 210.0), Some(0.4));
        assert_eq!(session.update(PointerId::Mouse, 220.0), Some(0.3));
        assert_eq!(session.update(PointerId::Mouse, 300.0), Some(0.0));
        // back up past the start: absolute mode has no memory of the clamp
        assert_eq!(session.update(PointerId::Mouse, 190.0), Some(0.6));
    }

    #[test]
    fn relative_session_accumulates_slow_drags() {
        let mut session = DragSession::new(
            ControlId::DelayKnob("DRUMS".into()),
            PointerId::Mouse,
            ControlKind::Knob { sensitivity: 0.005 },
            ReferenceMode::Relative,
            100.0,
            0.5,
            ListenerLease::none(),
        );
        // ten one-pixel moves upward: 10 * 0.005 = 0.05
        let mut last = None;
        for step in 1..=10 {
            last = session.update(PointerId::Mouse, 100.0 - step as f64);
        }
        assert_eq!(last, Some(0.55));
    }

    #[test]
    fn relative_session_clamps_each_step() {
        let mut session = DragSession::new(
            ControlId::DelayKnob("DRUMS".into()),
            PointerId::Mouse,
            ControlKind::Knob { sensitivity: 0.01 },
            ReferenceMode::Relative,
            100.0,
            0.9,
            ListenerLease::none(),
        );
        assert_eq!(session.update(PointerId::Mouse, 0.0), Some(1.0));
        // reversing responds immediately from the clamped value
        assert_eq!(session.update(PointerId::Mouse, 10.0), Some(0.9));
    }

    #[test]
    fn foreign_pointer_is_ignored() {
        let mut session = DragSession::new(
            fader(),
            PointerId::Touch(1),
            ControlKind::fader(),
            ReferenceMode::Absolute,
            0.0,
            0.5,
            ListenerLease::none(),
        );
        assert_eq!(session.update(PointerId::Touch(2), 50.0), None);
        assert_eq!(session.update(PointerId::Touch(1), 50.0), Some(0.0));
    }

    #[test]
    fn finished_session_drops_moves() {
        let mut session = DragSession::new(
            fader(),
            PointerId::Mouse,
            ControlKind::fader(),
            ReferenceMode::Absolute,
            0.0,
            0.5,
            ListenerLease::none(),
        );
        session.finish();
        assert!(!session.is_active());
        assert_eq!(session.update(PointerId::Mouse, 10.0), None);
    }

    #[test]
    fn one_session_per_control() {
        let released = Rc::new(Cell::new(0));
        let mut tracker = DragTracker::new();
        assert!(tracker.begin(
            fader(),
            PointerId::Touch(1),
            ControlKind::fader(),
            ReferenceMode::Absolute,
            0.0,
            0.5,
            counting_lease(&released),
        ));
        assert!(!tracker.begin(
            fader(),
            PointerId::Touch(2),
            ControlKind::fader(),
            ReferenceMode::Absolute,
            0.0,
            0.5,
            counting_lease(&released),
        ));
        // refused lease was released on the spot
        assert_eq!(released.get(), 1);
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn lease_released_exactly_once_on_end() {
        let released = Rc::new(Cell::new(0));
        let mut tracker = DragTracker::new();
        tracker.begin(
            fader(),
            PointerId::Mouse,
            ControlKind::fader(),
            ReferenceMode::Absolute,
            0.0,
            0.5,
            counting_lease(&released),
        );
        assert!(!tracker.end(&fader(), PointerId::Touch(3)));
        assert_eq!(released.get(), 0);
        assert!(tracker.end(&fader(), PointerId::Mouse));
        assert!(!tracker.end(&fader(), PointerId::Mouse));
        assert_eq!(released.get(), 1);
        assert_eq!(tracker.update(&fader(), PointerId::Mouse, 10.0), None);
    }

    #[test]
    fn teardown_releases_all_sessions() {
        let released = Rc::new(Cell::new(0));
        {
            let mut tracker = DragTracker::new();
            for label in ["A", "B"] {
                tracker.begin(
                    ControlId::Fader(label.into()),
                    PointerId::Mouse,
                    ControlKind::fader(),
                    ReferenceMode::Absolute,
                    0.0,
                    0.5,
                    counting_lease(&released),
                );
            }
        }
        assert_eq!(released.get(), 2);
    }
}
