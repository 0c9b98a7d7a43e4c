//! Gesture-to-parameter math. Pure functions, no shared state.
//!
//! Both control kinds are dragged vertically. Screen coordinates grow
//! downward, so moving the pointer down yields a positive `delta_y`.

/// Drag distance in pixels that moves a fader across its full range.
pub const DEFAULT_FADER_RESISTANCE: f64 = 100.0;

/// Knob change per pixel of upward drag.
pub const DEFAULT_KNOB_SENSITIVITY: f64 = 0.005;

/// Reported values are rounded to this many decimal places.
pub const VALUE_DECIMALS: i32 = 2;

/// Which mapping a control uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    /// Linear fader: `start - delta_y / resistance`.
    Fader { resistance: f64 },
    /// Vertically dragged rotary knob: `start + (-delta_y) * sensitivity`.
    Knob { sensitivity: f64 },
}

impl ControlKind {
    pub fn fader() -> Self {
        ControlKind::Fader {
            resistance: DEFAULT_FADER_RESISTANCE,
        }
    }

    pub fn knob() -> Self {
        ControlKind::Knob {
            sensitivity: DEFAULT_KNOB_SENSITIVITY,
        }
    }

    /// Map a vertical pixel delta onto `start`, unrounded but clamped to [0, 1].
    pub fn apply(self, start: f64, delta_y: f64) -> f64 {
        match self {
            ControlKind::Fader { resistance } => fader_raw(start, delta_y, resistance),
            ControlKind::Knob { sensitivity } => knob_raw(start, -delta_y, sensitivity),
        }
    }

    /// Map and round for reporting.
    pub fn map(self, start: f64, delta_y: f64) -> f64 {
        round_value(self.apply(start, delta_y))
    }
}

/// Fader mapping. Dragging down (`delta_y > 0`) lowers the value.
pub fn fader_value(start: f64, delta_y: f64, resistance: f64) -> f64 {
    round_value(fader_raw(start, delta_y, resistance))
}

/// Knob mapping. `delta_up` is how far the pointer moved up from the reference.
pub fn knob_value(start: f64, delta_up: f64, sensitivity: f64) -> f64 {
    round_value(knob_raw(start, delta_up, sensitivity))
}

fn fader_raw(start: f64, delta_y: f64, resistance: f64) -> f64 {
    clamp_unit(start - delta_y / resistance)
}

fn knob_raw(start: f64, delta_up: f64, sensitivity: f64) -> f64 {
    clamp_unit(start + delta_up * sensitivity)
}

/// Clamp into [0, 1]. NaN maps to 0 so a bad event can never poison state.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Round to [`VALUE_DECIMALS`] places.
pub fn round_value(value: f64) -> f64 {
    let scale = 10f64.powi(VALUE_DECIMALS);
    (value * scale).round() / scale
}

/// Linear mapping between the normalized [0, 1] range and a parameter range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ParamRange { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn to_normalized(&self, value: f64) -> f64 {
        clamp_unit((self.clamp(value) - self.min) / (self.max - self.min))
    }

    pub fn from_normalized(&self, normalized: f64) -> f64 {
        self.clamp(self.min + clamp_unit(normalized) * (self.max - self.min))
    }
}
