//! Per-stem routing and the delay-feedback controller.
//!
//! ```text
//! playback ──► gain ──► destination
//!    │          ▲
//!    └─► delay ─┤
//!         ▲     │
//!         └─ feedback
//! ```
//!
//! Gain, delay and feedback nodes live for the whole session; only the
//! playback node is replaced on every start.

use crate::audio::{AudioContext, NodeId, ParamKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemGraph {
    pub gain: NodeId,
    pub delay: NodeId,
    pub feedback: NodeId,
}

impl StemGraph {
    /// Create and wire the persistent nodes of one stem.
    pub fn build<C: AudioContext>(
        ctx: &mut C,
        max_delay_seconds: f64,
        delay_time: f64,
        feedback_amount: f64,
    ) -> Self {
        let gain = ctx.create_gain();
        let delay = ctx.create_delay(max_delay_seconds);
        let feedback = ctx.create_gain();

        ctx.set_value(delay, ParamKind::DelayTime, delay_time);
        ctx.set_value(feedback, ParamKind::Gain, feedback_amount);

        ctx.connect(delay, feedback);
        ctx.connect(feedback, delay);
        ctx.connect(delay, gain);
        let destination = ctx.destination();
        ctx.connect(gain, destination);

        StemGraph {
            gain,
            delay,
            feedback,
        }
    }

    /// Route a fresh playback node into both the dry and the delay path.
    pub fn attach<C: AudioContext>(&self, ctx: &mut C, playback: NodeId) {
        ctx.connect(playback, self.gain);
        ctx.connect(playback, self.delay);
    }

    /// Gain-stage writes are immediate.
    pub fn apply_gain<C: AudioContext>(&self, ctx: &mut C, gain: f64) {
        ctx.set_value(self.gain, ParamKind::Gain, gain);
    }

    /// Feedback changes glide toward `amount` with the given time constant
    /// instead of jumping, which would click.
    pub fn glide_feedback<C: AudioContext>(&self, ctx: &mut C, amount: f64, time_constant: f64) {
        let now = ctx.current_time();
        ctx.set_target_at_time(self.feedback, ParamKind::Gain, amount, now, time_constant);
    }
}
