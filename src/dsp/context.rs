//! Software audio context: a small node graph rendered in pure Rust.
//!
//! The browser host pulls blocks from [`SoftwareContext::render`] inside an
//! AudioWorklet; native hosts can feed the same output to any sink.
//!
//! Rendering one block:
//! 1. every delay node emits its delayed output (written in earlier blocks),
//! 2. the graph is evaluated on demand from the destination, each node once,
//! 3. every delay node ingests the sum of its inputs.
//!
//! Step 1 is what lets `delay -> feedback -> delay` loops render.

use log::{debug, warn};

use crate::audio::{AudioContext, ContextState, DecodedAudio, NodeId, ParamKind};
use crate::error::{MixerError, Result};

use super::BLOCK_SIZE;
use super::delay::DelayLine;
use super::mixer::MasterBus;
use super::param::Param;
use super::playback::PlaybackVoice;

#[derive(Debug)]
enum NodeKind {
    Destination,
    Gain { gain: Param },
    Delay { line: DelayLine, time: Param },
    Playback { voice: PlaybackVoice, rate: Param },
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    inputs: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            inputs: Vec::new(),
        }
    }

    fn param_mut(&mut self, param: ParamKind) -> Option<&mut Param> {
        match (&mut self.kind, param) {
            (NodeKind::Gain { gain }, ParamKind::Gain) => Some(gain),
            (NodeKind::Delay { time, .. }, ParamKind::DelayTime) => Some(time),
            (NodeKind::Playback { rate, .. }, ParamKind::PlaybackRate) => Some(rate),
            _ => None,
        }
    }

    fn param(&self, param: ParamKind) -> Option<&Param> {
        match (&self.kind, param) {
            (NodeKind::Gain { gain }, ParamKind::Gain) => Some(gain),
            (NodeKind::Delay { time, .. }, ParamKind::DelayTime) => Some(time),
            (NodeKind::Playback { rate, .. }, ParamKind::PlaybackRate) => Some(rate),
            _ => None,
        }
    }
}

/// Per-block evaluation scratch.
struct BlockState {
    frames: usize,
    start_time: f64,
    cache: Vec<Option<Vec<f32>>>,
    visiting: Vec<bool>,
}

pub struct SoftwareContext {
    sample_rate: f64,
    state: ContextState,
    autoplay_blocked: bool,
    frames_rendered: u64,
    nodes: Vec<Option<Node>>,
    /// Slots of released nodes, reused before the arena grows.
    free: Vec<usize>,
    destination: NodeId,
    bus: MasterBus,
    cycle_warned: bool,
}

impl SoftwareContext {
    /// A new context starts suspended, as browsers create them before the
    /// first user gesture.
    pub fn new(sample_rate: f64) -> Result<Self> {
        Self::with_master_gain(sample_rate, 1.0)
    }

    /// Fails with [`MixerError::Config`] unless `sample_rate` is finite and
    /// positive.
    pub fn with_master_gain(sample_rate: f64, master_gain: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(MixerError::Config(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        Ok(SoftwareContext {
            sample_rate,
            state: ContextState::Suspended,
            autoplay_blocked: false,
            frames_rendered: 0,
            nodes: vec![Some(Node::new(NodeKind::Destination))],
            free: Vec::new(),
            destination: NodeId(0),
            bus: MasterBus::new(master_gain as f32),
            cycle_warned: false,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Simulate the host's autoplay policy: while blocked, `resume` fails.
    pub fn set_autoplay_blocked(&mut self, blocked: bool) {
        self.autoplay_blocked = blocked;
    }

    /// Render mono output. Silent, with the clock held, while suspended.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state == ContextState::Suspended {
            out.fill(0.0);
            return;
        }
        for block in out.chunks_mut(BLOCK_SIZE) {
            self.render_block(block);
        }
    }

    /// Number of playback nodes that still exist (stopped or not).
    pub fn playback_count(&self) -> usize {
        self.live_nodes()
            .filter(|n| matches!(n.kind, NodeKind::Playback { .. }))
            .count()
    }

    /// Number of playback nodes currently producing sound.
    pub fn playing_count(&self) -> usize {
        self.live_nodes()
            .filter(|n| matches!(&n.kind, NodeKind::Playback { voice, .. } if !voice.is_finished()))
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.live_nodes().count()
    }

    /// Current value of a node parameter, if the node has it.
    pub fn param_value(&self, node: NodeId, param: ParamKind) -> Option<f64> {
        self.node(node)?.param(param).map(Param::value)
    }

    pub fn is_connected(&self, from: NodeId, to: NodeId) -> bool {
        self.node(to).is_some_and(|n| n.inputs.contains(&from))
    }

    fn live_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let node = Some(Node::new(kind));
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        let frames = out.len();
        let mut block = BlockState {
            frames,
            start_time: self.current_time(),
            cache: vec![None; self.nodes.len()],
            visiting: vec![false; self.nodes.len()],
        };

        let mut delay_ids = Vec::new();
        for (i, slot) in self.nodes.iter_mut().enumerate() {
            if let Some(Node {
                kind: NodeKind::Delay { line, time },
                ..
            }) = slot
            {
                let delay_time = time.advance(block.start_time);
                let mut tap = vec![0.0; frames];
                line.read_block(&mut tap, delay_time);
                block.cache[i] = Some(tap);
                delay_ids.push(NodeId(i));
            }
        }

        let mixed = self.sum_inputs(self.destination, &mut block);
        self.bus.clear(frames);
        self.bus.add_block(&mixed);
        self.bus.output_into(out);

        for id in delay_ids {
            let input = self.sum_inputs(id, &mut block);
            if let Some(Node {
                kind: NodeKind::Delay { line, .. },
                ..
            }) = self.node_mut(id)
            {
                line.write_block(&input);
            }
        }

        self.frames_rendered += frames as u64;
    }

    fn sum_inputs(&mut self, id: NodeId, block: &mut BlockState) -> Vec<f32> {
        let mut acc = vec![0.0; block.frames];
        let inputs = match self.node(id) {
            Some(node) => node.inputs.clone(),
            None => return acc,
        };
        for input in inputs {
            let signal = self.eval(input, block);
            for (a, s) in acc.iter_mut().zip(&signal) {
                *a += s;
            }
        }
        acc
    }

    fn eval(&mut self, id: NodeId, block: &mut BlockState) -> Vec<f32> {
        if let Some(Some(cached)) = block.cache.get(id.0) {
            return cached.clone();
        }
        if id.0 >= block.visiting.len() || self.node(id).is_none() {
            return vec![0.0; block.frames];
        }
        if block.visiting[id.0] {
            if !self.cycle_warned {
                warn!("node {} sits in a cycle without a delay; rendering silence", id.0);
                self.cycle_warned = true;
            }
            return vec![0.0; block.frames];
        }
        block.visiting[id.0] = true;

        let mut signal = self.sum_inputs(id, block);
        let dt = 1.0 / self.sample_rate;
        let t0 = block.start_time;
        if let Some(node) = self.node_mut(id) {
            match &mut node.kind {
                NodeKind::Gain { gain } => {
                    for (i, s) in signal.iter_mut().enumerate() {
                        *s *= gain.advance(t0 + i as f64 * dt) as f32;
                    }
                }
                NodeKind::Playback { voice, rate } => {
                    for (i, s) in signal.iter_mut().enumerate() {
                        *s = voice.next_sample(rate.advance(t0 + i as f64 * dt));
                    }
                }
                NodeKind::Destination | NodeKind::Delay { .. } => {}
            }
        }

        block.visiting[id.0] = false;
        block.cache[id.0] = Some(signal.clone());
        signal
    }
}

impl AudioContext for SoftwareContext {
    fn state(&self) -> ContextState {
        self.state
    }

    async fn resume(&mut self) -> Result<()> {
        if self.autoplay_blocked {
            return Err(MixerError::ContextUnavailable(
                "autoplay blocked until a user gesture".into(),
            ));
        }
        if self.state != ContextState::Running {
            debug!("audio context resumed at {:.3}s", self.current_time());
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate
    }

    fn destination(&self) -> NodeId {
        self.destination
    }

    fn create_gain(&mut self) -> NodeId {
        self.add_node(NodeKind::Gain {
            gain: Param::new(1.0),
        })
    }

    fn create_delay(&mut self, max_delay_seconds: f64) -> NodeId {
        self.add_node(NodeKind::Delay {
            line: DelayLine::new(self.sample_rate, max_delay_seconds),
            time: Param::new(0.0),
        })
    }

    fn create_playback(&mut self, label: &str, source: &DecodedAudio) -> Result<NodeId> {
        if source.sample_rate == 0 {
            return Err(MixerError::playback_rejected(label, "source has no sample rate"));
        }
        if source.is_empty() {
            return Err(MixerError::playback_rejected(label, "source buffer is empty"));
        }
        Ok(self.add_node(NodeKind::Playback {
            voice: PlaybackVoice::new(source, self.sample_rate),
            rate: Param::new(1.0),
        }))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) {
        if self.node(from).is_none() {
            return;
        }
        if let Some(node) = self.node_mut(to) {
            if !node.inputs.contains(&from) {
                node.inputs.push(from);
            }
        }
    }

    fn disconnect(&mut self, node: NodeId) {
        for other in self.nodes.iter_mut().flatten() {
            other.inputs.retain(|&input| input != node);
        }
        let stopped_playback = matches!(
            self.node(node),
            Some(Node { kind: NodeKind::Playback { voice, .. }, .. }) if voice.is_stopped()
        );
        if stopped_playback {
            self.nodes[node.0] = None;
            self.free.push(node.0);
        }
    }

    fn is_playing(&self, node: NodeId) -> bool {
        matches!(
            self.node(node),
            Some(Node { kind: NodeKind::Playback { voice, .. }, .. }) if !voice.is_finished()
        )
    }

    fn stop(&mut self, node: NodeId) {
        if let Some(Node {
            kind: NodeKind::Playback { voice, .. },
            ..
        }) = self.node_mut(node)
        {
            voice.stop();
        }
    }

    fn set_value(&mut self, node: NodeId, param: ParamKind, value: f64) {
        match self.node_mut(node).and_then(|n| n.param_mut(param)) {
            Some(p) => p.set_value(value),
            None => debug!("node {} has no {param:?} parameter", node.0),
        }
    }

    fn set_target_at_time(
        &mut self,
        node: NodeId,
        param: ParamKind,
        target: f64,
        start_time: f64,
        time_constant: f64,
    ) {
        match self.node_mut(node).and_then(|n| n.param_mut(param)) {
            Some(p) => p.set_target_at_time(target, start_time, time_constant),
            None => debug!("node {} has no {param:?} parameter", node.0),
        }
    }
}
