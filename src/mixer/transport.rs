//! Play/stop orchestration across all stems.

use log::{debug, warn};
use serde::Serialize;

use crate::audio::{AudioContext, ContextState, NodeId, ParamKind};
use crate::error::{MixerError, Result};

use super::graph::StemGraph;
use super::solo;
use super::stem::Stem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    Idle,
    Playing,
    /// The audio context refused to run; the next `play` retries.
    Blocked,
}

/// Outcome of a `play` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayReport {
    /// Stems that got a playback node.
    pub started: Vec<String>,
    /// Stems the host refused to start.
    pub rejected: Vec<MixerError>,
    /// Stems with no loaded audio.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveNode {
    label: String,
    node: NodeId,
}

/// Owns the registry of live playback nodes. A node's lifetime is exactly
/// one play-to-stop cycle.
#[derive(Debug)]
pub struct TransportController {
    state: TransportState,
    live: Vec<LiveNode>,
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportController {
    pub fn new() -> Self {
        TransportController {
            state: TransportState::Idle,
            live: Vec::new(),
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.live.iter().map(|l| l.node)
    }

    /// Labels of live stems whose playback node is still producing sound.
    /// Stems do not loop, so this empties once every buffer has run out
    /// even though the transport stays `Playing` until `stop`.
    pub fn sounding<C: AudioContext>(&self, ctx: &C) -> Vec<String> {
        self.live
            .iter()
            .filter(|l| ctx.is_playing(l.node))
            .map(|l| l.label.clone())
            .collect()
    }

    /// Start every loaded stem from the top.
    ///
    /// `stems` and `graphs` are parallel, in registry order. Fails only when
    /// the context cannot be resumed; the transport is then `Blocked`.
    pub async fn play<C: AudioContext>(
        &mut self,
        ctx: &mut C,
        stems: &[Stem],
        graphs: &[StemGraph],
        varispeed: f64,
    ) -> Result<PlayReport> {
        if ctx.state() == ContextState::Suspended {
            if let Err(e) = ctx.resume().await {
                warn!("playback blocked: {e}");
                self.stop(ctx);
                self.state = TransportState::Blocked;
                return Err(e);
            }
        }

        self.stop(ctx);

        let gains = solo::resolve(stems);
        let mut report = PlayReport::default();
        for ((stem, graph), gain) in stems.iter().zip(graphs).zip(gains) {
            let Some(source) = stem.loaded_source() else {
                report.unavailable.push(stem.label().to_string());
                continue;
            };
            let node = match ctx.create_playback(stem.label(), source) {
                Ok(node) => node,
                Err(e) => {
                    warn!("{e}");
                    report.rejected.push(e);
                    continue;
                }
            };
            graph.attach(ctx, node);
            ctx.set_value(node, ParamKind::PlaybackRate, varispeed);
            graph.apply_gain(ctx, gain);
            self.live.push(LiveNode {
                label: stem.label().to_string(),
                node,
            });
            report.started.push(stem.label().to_string());
        }

        self.state = if self.live.is_empty() {
            TransportState::Idle
        } else {
            TransportState::Playing
        };
        debug!(
            "transport {:?}: {} started, {} rejected, {} unavailable",
            self.state,
            report.started.len(),
            report.rejected.len(),
            report.unavailable.len()
        );
        Ok(report)
    }

    /// Stop and disconnect every live playback node. Safe in any state;
    /// returns how many nodes were torn down.
    pub fn stop<C: AudioContext>(&mut self, ctx: &mut C) -> usize {
        let count = self.live.len();
        for live in self.live.drain(..) {
            ctx.stop(live.node);
            ctx.disconnect(live.node);
            debug!("stopped {}", live.label);
        }
        if self.state == TransportState::Playing {
            self.state = TransportState::Idle;
        }
        count
    }
}
