//! Continuous gesture input: pointer/touch motion to clamped parameter values.

pub mod adapter;
pub mod mapper;
pub mod session;

pub use adapter::{PointerInput, PointerKind, PointerPhase, TouchInput, TouchPhase, TouchPoint};
pub use mapper::{ControlKind, ParamRange};
pub use session::{
    ControlId, DragSession, DragTracker, GestureEvent, ListenerLease, Phase, PointerId, ReferenceMode,
};
