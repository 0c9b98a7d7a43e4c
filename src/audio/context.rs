//! The audio context the mixer drives: node factories, connections and
//! parameter automation, addressed through opaque [`NodeId`]s.
//!
//! In the browser this is backed by [`crate::dsp::SoftwareContext`] running
//! inside an AudioWorklet; tests can substitute their own implementation.

use std::future::Future;

use crate::audio::source::DecodedAudio;
use crate::error::Result;

/// Handle to a node owned by an [`AudioContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
}

/// Automatable parameter of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Gain node multiplier.
    Gain,
    /// Delay node delay time, seconds.
    DelayTime,
    /// Playback node rate multiplier.
    PlaybackRate,
}

pub trait AudioContext {
    fn state(&self) -> ContextState;

    /// Bring a suspended context to `Running`. Fails with
    /// [`crate::MixerError::ContextUnavailable`] when the host blocks audio.
    fn resume(&mut self) -> impl Future<Output = Result<()>>;

    /// Monotonic clock used to schedule automation, seconds.
    fn current_time(&self) -> f64;

    /// The master output node.
    fn destination(&self) -> NodeId;

    fn create_gain(&mut self) -> NodeId;

    fn create_delay(&mut self, max_delay_seconds: f64) -> NodeId;

    /// Create a single-use playback node over `source`. It starts producing
    /// sound as soon as it is connected and the context runs.
    fn create_playback(&mut self, label: &str, source: &DecodedAudio) -> Result<NodeId>;

    fn connect(&mut self, from: NodeId, to: NodeId);

    /// Remove every outgoing connection of `node`. Stopped playback nodes are
    /// released by this call.
    fn disconnect(&mut self, node: NodeId);

    /// Whether `node` is a playback node still producing sound: not stopped
    /// and not past the end of its buffer.
    fn is_playing(&self, node: NodeId) -> bool;

    /// Stop a playback node. Stopping twice, or stopping another node kind,
    /// does nothing.
    fn stop(&mut self, node: NodeId);

    /// Jump a parameter to `value` now, cancelling any automation.
    fn set_value(&mut self, node: NodeId, param: ParamKind, value: f64);

    /// Approach `target` exponentially from `start_time` with time constant
    /// `time_constant` seconds.
    fn set_target_at_time(
        &mut self,
        node: NodeId,
        param: ParamKind,
        target: f64,
        start_time: f64,
        time_constant: f64,
    );
}
