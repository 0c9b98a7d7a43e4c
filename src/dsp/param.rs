//! Automatable parameter: immediate writes and exponential target approach.

#[derive(Debug, Clone, Copy, PartialEq)]
struct Approach {
    from: f64,
    target: f64,
    start_time: f64,
    time_constant: f64,
}

/// A single audio parameter evaluated against the context clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    value: f64,
    approach: Option<Approach>,
}

impl Param {
    pub fn new(value: f64) -> Self {
        Param {
            value,
            approach: None,
        }
    }

    /// Jump to `value`, cancelling automation.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.approach = None;
    }

    /// Start approaching `target` at `start_time`. The curve starts from the
    /// value the parameter holds at `start_time`.
    pub fn set_target_at_time(&mut self, target: f64, start_time: f64, time_constant: f64) {
        let from = self.value_at(start_time);
        if time_constant <= 0.0 {
            self.set_value(target);
            return;
        }
        self.value = from;
        self.approach = Some(Approach {
            from,
            target,
            start_time,
            time_constant,
        });
    }

    /// Value at time `t`, in seconds on the context clock.
    pub fn value_at(&self, t: f64) -> f64 {
        match self.approach {
            None => self.value,
            Some(a) if t <= a.start_time => a.from,
            Some(a) => a.target + (a.from - a.target) * (-(t - a.start_time) / a.time_constant).exp(),
        }
    }

    /// Advance to time `t` and return the value there.
    pub fn advance(&mut self, t: f64) -> f64 {
        self.value = self.value_at(t);
        self.value
    }

    /// Last evaluated value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_automating(&self) -> bool {
        self.approach.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_write() {
        let mut p = Param::new(1.0);
        p.set_value(0.25);
        assert_eq!(p.value_at(100.0), 0.25);
        assert!(!p.is_automating());
    }

    #[test]
    fn approach_is_exponential() {
        let mut p = Param::new(0.0);
        p.set_target_at_time(0.8, 1.0, 2.5);
        assert_eq!(p.value_at(0.5), 0.0);
        assert_eq!(p.value_at(1.0), 0.0);
        // one time constant: 1 - 1/e of the way
        let expected = 0.8 * (1.0 - (-1.0f64).exp());
        assert!((p.value_at(3.5) - expected).abs() < 1e-12);
        // never overshoots
        assert!(p.value_at(1000.0) <= 0.8);
        assert!((p.value_at(1000.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn retarget_starts_from_current_curve_value() {
        let mut p = Param::new(0.0);
        p.set_target_at_time(1.0, 0.0, 1.0);
        let midway = p.value_at(1.0);
        p.set_target_at_time(0.0, 1.0, 1.0);
        assert!((p.value_at(1.0) - midway).abs() < 1e-12);
        assert!(p.value_at(2.0) < midway);
    }

    #[test]
    fn zero_time_constant_jumps() {
        let mut p = Param::new(0.0);
        p.set_target_at_time(0.5, 0.0, 0.0);
        assert_eq!(p.value_at(0.0), 0.5);
    }
}
