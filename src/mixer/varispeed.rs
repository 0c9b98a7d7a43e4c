use crate::audio::{AudioContext, NodeId, ParamKind};
use crate::input::ParamRange;

/// Allowed varispeed range (tape-style speed multiplier).
pub const VARISPEED_RANGE: ParamRange = ParamRange::new(0.5, 1.5);

/// One global playback rate shared by every stem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarispeedController {
    rate: f64,
}

impl Default for VarispeedController {
    fn default() -> Self {
        VarispeedController { rate: 1.0 }
    }
}

impl VarispeedController {
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Clamp and store `rate`, then push it to every live playback node.
    /// With nothing live the value waits for the next play.
    pub fn set<C: AudioContext>(
        &mut self,
        ctx: &mut C,
        rate: f64,
        live: impl IntoIterator<Item = NodeId>,
    ) -> f64 {
        self.rate = VARISPEED_RANGE.clamp(rate);
        for node in live {
            ctx.set_value(node, ParamKind::PlaybackRate, self.rate);
        }
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DecodedAudio;
    use crate::dsp::SoftwareContext;

    #[test]
    fn clamps_to_range() {
        let mut ctx = SoftwareContext::new(1000.0).unwrap();
        let mut speed = VarispeedController::default();
        assert_eq!(speed.set(&mut ctx, 2.0, []), 1.5);
        assert_eq!(speed.set(&mut ctx, 0.1, []), 0.5);
        assert_eq!(speed.set(&mut ctx, 1.1, []), 1.1);
    }

    #[test]
    fn pushes_to_live_nodes() {
        let mut ctx = SoftwareContext::new(1000.0).unwrap();
        let audio = DecodedAudio::new(vec![0.0; 16], 1000);
        let a = ctx.create_playback("A", &audio).unwrap();
        let b = ctx.create_playback("B", &audio).unwrap();
        let mut speed = VarispeedController::default();
        speed.set(&mut ctx, 0.75, [a, b]);
        assert_eq!(ctx.param_value(a, ParamKind::PlaybackRate), Some(0.75));
        assert_eq!(ctx.param_value(b, ParamKind::PlaybackRate), Some(0.75));
    }
}
