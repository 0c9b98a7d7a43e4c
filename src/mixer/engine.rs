//! MixerEngine: the composition root.
//!
//! Owns the stem registry, the per-stem graphs, the transport, varispeed and
//! the live drag sessions. Every control operation runs synchronously on the
//! caller's thread and leaves the audio graph consistent before returning.

use log::{info, warn};

use crate::audio::{AssetProvider, AudioContext, DecodedAudio, NodeId};
use crate::config::MixerConfig;
use crate::error::{MixerError, Result};
use crate::input::{ControlId, ControlKind, DragTracker, GestureEvent, ListenerLease, Phase, ReferenceMode};

use super::graph::StemGraph;
use super::snapshot::MixerSnapshot;
use super::solo;
use super::stem::{SourceState, Stem, StemParams, StemRegistry};
use super::transport::{PlayReport, TransportController, TransportState};
use super::varispeed::{VARISPEED_RANGE, VarispeedController};

/// Outcome of loading every configured stem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub unavailable: Vec<MixerError>,
}

pub struct MixerEngine<C: AudioContext> {
    config: MixerConfig,
    ctx: C,
    stems: StemRegistry,
    graphs: Vec<StemGraph>,
    transport: TransportController,
    varispeed: VarispeedController,
    drags: DragTracker,
}

impl<C: AudioContext> MixerEngine<C> {
    /// Validate `config` and build the persistent graph of every stem.
    pub fn new(config: MixerConfig, mut ctx: C) -> Result<Self> {
        config.validate()?;
        let stems = StemRegistry::new(&config.stems);
        let delay_time = config.eighth_note_seconds();
        let graphs = stems
            .iter()
            .map(|stem| {
                StemGraph::build(
                    &mut ctx,
                    config.max_delay_seconds,
                    delay_time,
                    stem.params.delay_feedback,
                )
            })
            .collect();
        let mut engine = MixerEngine {
            config,
            ctx,
            stems,
            graphs,
            transport: TransportController::new(),
            varispeed: VarispeedController::default(),
            drags: DragTracker::new(),
        };
        engine.push_gains();
        Ok(engine)
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn stems(&self) -> &[Stem] {
        self.stems.as_slice()
    }

    pub fn stem(&self, label: &str) -> Option<&Stem> {
        self.stems.get(label)
    }

    pub fn graph(&self, label: &str) -> Option<&StemGraph> {
        self.graphs.get(self.stems.index_of(label)?)
    }

    pub fn effective_gain(&self, label: &str) -> Option<f64> {
        let stem = self.stems.get(label)?;
        Some(solo::effective_gain(stem, self.stems.as_slice()))
    }

    pub fn varispeed(&self) -> f64 {
        self.varispeed.rate()
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport.state()
    }

    pub fn live_playback_count(&self) -> usize {
        self.transport.live_count()
    }

    /// Playback nodes started by the current play.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.transport.live_nodes()
    }

    pub fn snapshot(&self) -> MixerSnapshot {
        MixerSnapshot::capture(
            self.stems.as_slice(),
            self.varispeed.rate(),
            self.transport.state(),
            &self.transport.sounding(&self.ctx),
        )
    }

    // ── Sources ─────────────────────────────────────────────

    /// Hand decoded audio to a stem. Takes effect on the next play.
    pub fn attach_source(&mut self, label: &str, audio: DecodedAudio) -> bool {
        let attached = self.stems.set_source(label, SourceState::Loaded(audio));
        if !attached {
            warn!("attach_source: unknown stem '{label}'");
        }
        attached
    }

    pub fn mark_unavailable(&mut self, label: &str, reason: impl Into<String>) {
        if !self.stems.set_source(label, SourceState::Unavailable(reason.into())) {
            warn!("mark_unavailable: unknown stem '{label}'");
        }
    }

    /// Load every configured stem in order. A failing stem is marked
    /// unavailable and the rest still load.
    pub async fn load_stems<P: AssetProvider>(&mut self, provider: &P) -> LoadReport {
        let specs: Vec<_> = self.stems.iter().map(|s| s.spec.clone()).collect();
        let mut report = LoadReport::default();
        for spec in specs {
            match provider.load_stem(&spec).await {
                Ok(audio) => {
                    info!(
                        "loaded {} ({:.1}s @ {} Hz)",
                        spec.label,
                        audio.duration_seconds(),
                        audio.sample_rate
                    );
                    self.stems.set_source(&spec.label, SourceState::Loaded(audio));
                    report.loaded.push(spec.label);
                }
                Err(e) => {
                    warn!("{e}");
                    self.stems.set_source(&spec.label, SourceState::Unavailable(e.to_string()));
                    report.unavailable.push(e);
                }
            }
        }
        report
    }

    // ── Controls ────────────────────────────────────────────

    pub fn set_volume(&mut self, label: &str, volume: f64) {
        if self.update_stem(label, |p| p.with_volume(volume)).is_some() {
            self.push_gains();
        }
    }

    pub fn toggle_mute(&mut self, label: &str) {
        if self.update_stem(label, StemParams::toggled_mute).is_some() {
            self.push_gains();
        }
    }

    pub fn toggle_solo(&mut self, label: &str) {
        if self.update_stem(label, StemParams::toggled_solo).is_some() {
            self.push_gains();
        }
    }

    /// Clear every solo and every mute.
    pub fn unsolo_all(&mut self) {
        self.stems.update_all(|p| StemParams {
            soloed: false,
            muted: false,
            ..p
        });
        self.push_gains();
    }

    /// Set a stem's delay feedback. The feedback gain glides toward the new
    /// amount instead of jumping.
    pub fn set_delay(&mut self, label: &str, amount: f64) {
        let Some(index) = self.update_stem(label, |p| p.with_delay_feedback(amount)) else {
            return;
        };
        let target = self.stems.as_slice()[index].params.delay_feedback;
        self.graphs[index].glide_feedback(&mut self.ctx, target, self.config.feedback_time_constant);
    }

    /// Clamp to [0.5, 1.5] and apply to every live playback node.
    pub fn set_varispeed(&mut self, rate: f64) -> f64 {
        self.varispeed.set(&mut self.ctx, rate, self.transport.live_nodes())
    }

    // ── Transport ───────────────────────────────────────────

    /// Resume the context if needed, tear down any previous playback, then
    /// start every loaded stem at the current varispeed and effective gain.
    pub async fn play(&mut self) -> Result<PlayReport> {
        self.transport
            .play(
                &mut self.ctx,
                self.stems.as_slice(),
                &self.graphs,
                self.varispeed.rate(),
            )
            .await
    }

    pub fn stop(&mut self) -> usize {
        self.transport.stop(&mut self.ctx)
    }

    // ── Gestures ────────────────────────────────────────────

    /// Route a normalized gesture event to the control's parameter.
    /// Returns the value applied by a move, in the parameter's own units.
    pub fn handle_gesture(&mut self, control: &ControlId, event: GestureEvent) -> Option<f64> {
        self.handle_gesture_with_lease(control, event, ListenerLease::none())
    }

    /// Like [`Self::handle_gesture`], but a `Start` keeps `lease` alive for
    /// the session; it is released when the session ends. Leases passed with
    /// any other phase, or with a refused start, are released immediately.
    pub fn handle_gesture_with_lease(
        &mut self,
        control: &ControlId,
        event: GestureEvent,
        lease: ListenerLease,
    ) -> Option<f64> {
        match event.phase {
            Phase::Start => {
                let Some(value) = self.control_value(control) else {
                    warn!("gesture on unknown control {control}");
                    return None;
                };
                let (kind, mode) = self.control_mapping(control);
                self.drags
                    .begin(control.clone(), event.pointer, kind, mode, event.axis, value, lease);
                None
            }
            Phase::Move => {
                let normalized = self.drags.update(control, event.pointer, event.axis)?;
                Some(self.apply_control(control, normalized))
            }
            Phase::End | Phase::Leave | Phase::Cancel => {
                self.drags.end(control, event.pointer);
                None
            }
        }
    }

    pub fn is_dragging(&self, control: &ControlId) -> bool {
        self.drags.is_dragging(control)
    }

    /// End every drag session (surface teardown).
    pub fn cancel_gestures(&mut self) {
        self.drags.cancel_all();
    }

    /// Current normalized [0, 1] value of a control.
    pub fn control_value(&self, control: &ControlId) -> Option<f64> {
        match control {
            ControlId::Fader(label) => self.stems.get(label).map(|s| s.params.volume),
            ControlId::DelayKnob(label) => self.stems.get(label).map(|s| s.params.delay_feedback),
            ControlId::Varispeed => Some(VARISPEED_RANGE.to_normalized(self.varispeed.rate())),
        }
    }

    fn control_mapping(&self, control: &ControlId) -> (ControlKind, ReferenceMode) {
        let fader = ControlKind::Fader {
            resistance: self.config.fader_resistance,
        };
        match control {
            ControlId::Fader(_) | ControlId::Varispeed => (fader, ReferenceMode::Absolute),
            ControlId::DelayKnob(_) => (
                ControlKind::Knob {
                    sensitivity: self.config.knob_sensitivity,
                },
                ReferenceMode::Relative,
            ),
        }
    }

    fn apply_control(&mut self, control: &ControlId, normalized: f64) -> f64 {
        match control {
            ControlId::Fader(label) => {
                self.set_volume(label, normalized);
                normalized
            }
            ControlId::DelayKnob(label) => {
                self.set_delay(label, normalized);
                normalized
            }
            ControlId::Varispeed => self.set_varispeed(VARISPEED_RANGE.from_normalized(normalized)),
        }
    }

    fn update_stem(&mut self, label: &str, f: impl FnOnce(StemParams) -> StemParams) -> Option<usize> {
        let index = self.stems.update(label, f);
        if index.is_none() {
            warn!("unknown stem '{label}'");
        }
        index
    }

    /// Re-resolve mute/solo and write every stem's gain stage. Solo on one
    /// stem changes the gain of all the others, so this always covers all.
    fn push_gains(&mut self) {
        let gains = solo::resolve(self.stems.as_slice());
        for (graph, gain) in self.graphs.iter().zip(gains) {
            graph.apply_gain(&mut self.ctx, gain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ParamKind;
    use crate::config::StemSpec;
    use crate::dsp::SoftwareContext;
    use crate::input::PointerId;

    fn engine(labels: &[&str]) -> MixerEngine<SoftwareContext> {
        let config = MixerConfig {
            stems: labels.iter().map(|l| StemSpec::new(*l, format!("{l}.mp3"))).collect(),
            ..MixerConfig::default()
        };
        MixerEngine::new(config, SoftwareContext::new(1000.0).unwrap()).unwrap()
    }

    fn gain_param(engine: &MixerEngine<SoftwareContext>, label: &str) -> f64 {
        let graph = engine.graph(label).unwrap();
        engine.context().param_value(graph.gain, ParamKind::Gain).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MixerConfig {
            tempo_bpm: 0.0,
            ..MixerConfig::default()
        };
        assert!(MixerEngine::new(config, SoftwareContext::new(1000.0).unwrap()).is_err());
    }

    #[test]
    fn delay_time_is_an_eighth_note() {
        let engine = engine(&["DRUMS"]);
        let graph = engine.graph("DRUMS").unwrap();
        assert_eq!(
            engine.context().param_value(graph.delay, ParamKind::DelayTime),
            Some(0.25)
        );
    }

    #[test]
    fn mute_solo_scenario() {
        let mut engine = engine(&["Drums", "Bass"]);
        engine.toggle_mute("Drums");
        assert_eq!(engine.effective_gain("Drums"), Some(0.0));
        assert_eq!(engine.effective_gain("Bass"), Some(1.0));

        engine.toggle_solo("Bass");
        assert_eq!(engine.effective_gain("Drums"), Some(0.0));
        assert_eq!(engine.effective_gain("Bass"), Some(1.0));

        engine.toggle_solo("Drums");
        assert!(!engine.stem("Drums").unwrap().params.muted);
        assert_eq!(engine.effective_gain("Drums"), Some(1.0));
        assert_eq!(engine.effective_gain("Bass"), Some(1.0));
        assert_eq!(gain_param(&engine, "Drums"), 1.0);
    }

    #[test]
    fn solo_rewrites_every_gain_stage() {
        let mut engine = engine(&["A", "B", "C"]);
        engine.set_volume("B", 0.6);
        engine.toggle_solo("B");
        assert_eq!(gain_param(&engine, "A"), 0.0);
        assert_eq!(gain_param(&engine, "B"), 0.6);
        assert_eq!(gain_param(&engine, "C"), 0.0);

        engine.unsolo_all();
        assert_eq!(gain_param(&engine, "A"), 1.0);
        assert_eq!(gain_param(&engine, "C"), 1.0);
        assert!(!engine.snapshot().any_soloed);
    }

    #[test]
    fn unsolo_all_clears_mutes_too() {
        let mut engine = engine(&["A", "B"]);
        engine.toggle_mute("A");
        engine.toggle_solo("B");
        engine.unsolo_all();
        let stem = engine.stem("A").unwrap();
        assert!(!stem.params.muted && !stem.params.soloed);
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let mut engine = engine(&["A"]);
        let before = engine.snapshot();
        engine.set_volume("NOPE", 0.1);
        engine.toggle_mute("NOPE");
        engine.set_delay("NOPE", 0.5);
        assert!(!engine.attach_source("NOPE", DecodedAudio::new(vec![0.0], 1000)));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn volume_clamps() {
        let mut engine = engine(&["A"]);
        engine.set_volume("A", 3.0);
        assert_eq!(engine.stem("A").unwrap().params.volume, 1.0);
        engine.set_volume("A", -3.0);
        assert_eq!(gain_param(&engine, "A"), 0.0);
    }

    #[test]
    fn varispeed_retained_until_play() {
        let mut engine = engine(&["A"]);
        assert_eq!(engine.set_varispeed(2.0), 1.5);
        assert_eq!(engine.varispeed(), 1.5);
    }

    #[test]
    fn fader_gesture_drives_volume() {
        let mut engine = engine(&["A"]);
        let fader = ControlId::Fader("A".into());
        engine.set_volume("A", 0.5);
        engine.handle_gesture(&fader, GestureEvent::new(PointerId::Mouse, 300.0, Phase::Start));
        assert!(engine.is_dragging(&fader));
        let v = engine.handle_gesture(&fader, GestureEvent::new(PointerId::Mouse, 400.0, Phase::Move));
        assert_eq!(v, Some(0.0));
        assert_eq!(gain_param(&engine, "A"), 0.0);

        engine.handle_gesture(&fader, GestureEvent::new(PointerId::Mouse, 400.0, Phase::End));
        assert!(!engine.is_dragging(&fader));
        let late = engine.handle_gesture(&fader, GestureEvent::new(PointerId::Mouse, 200.0, Phase::Move));
        assert_eq!(late, None);
        assert_eq!(engine.stem("A").unwrap().params.volume, 0.0);
    }

    #[test]
    fn varispeed_gesture_maps_into_range() {
        let mut engine = engine(&["A"]);
        let control = ControlId::Varispeed;
        engine.handle_gesture(&control, GestureEvent::new(PointerId::Touch(4), 100.0, Phase::Start));
        // up 25px from normalized 0.5 -> 0.75 -> rate 1.25
        let rate = engine.handle_gesture(&control, GestureEvent::new(PointerId::Touch(4), 75.0, Phase::Move));
        assert_eq!(rate, Some(1.25));
        assert_eq!(engine.varispeed(), 1.25);
    }

    #[test]
    fn gesture_on_unknown_stem_is_ignored() {
        let mut engine = engine(&["A"]);
        let control = ControlId::DelayKnob("NOPE".into());
        engine.handle_gesture(&control, GestureEvent::new(PointerId::Mouse, 0.0, Phase::Start));
        assert!(!engine.is_dragging(&control));
    }

    fn counting_lease(count: &std::rc::Rc<std::cell::Cell<u32>>) -> ListenerLease {
        let count = std::rc::Rc::clone(count);
        ListenerLease::new(move || count.set(count.get() + 1))
    }

    #[test]
    fn lease_is_released_when_a_start_is_refused() {
        let mut engine = engine(&["A"]);
        let released = std::rc::Rc::new(std::cell::Cell::new(0));

        let unknown = ControlId::Fader("NOPE".into());
        let start = GestureEvent::new(PointerId::Mouse, 10.0, Phase::Start);
        engine.handle_gesture_with_lease(&unknown, start, counting_lease(&released));
        assert_eq!(released.get(), 1);

        let fader = ControlId::Fader("A".into());
        engine.handle_gesture_with_lease(&fader, start, counting_lease(&released));
        assert_eq!(released.get(), 1);
        let second = GestureEvent::new(PointerId::Touch(2), 10.0, Phase::Start);
        engine.handle_gesture_with_lease(&fader, second, counting_lease(&released));
        assert_eq!(released.get(), 2);
        assert!(engine.is_dragging(&fader));
    }

    #[test]
    fn lease_is_released_once_on_end() {
        let mut engine = engine(&["A"]);
        let released = std::rc::Rc::new(std::cell::Cell::new(0));
        let knob = ControlId::DelayKnob("A".into());

        let start = GestureEvent::new(PointerId::Mouse, 50.0, Phase::Start);
        engine.handle_gesture_with_lease(&knob, start, counting_lease(&released));
        engine.handle_gesture(&knob, GestureEvent::new(PointerId::Mouse, 40.0, Phase::Move));
        assert_eq!(released.get(), 0);

        engine.handle_gesture(&knob, GestureEvent::new(PointerId::Mouse, 40.0, Phase::End));
        assert_eq!(released.get(), 1);
        engine.handle_gesture(&knob, GestureEvent::new(PointerId::Mouse, 40.0, Phase::End));
        engine.cancel_gestures();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn cancel_gestures_releases_every_lease_once() {
        let mut engine = engine(&["A", "B"]);
        let released = std::rc::Rc::new(std::cell::Cell::new(0));
        for (control, touch) in [
            (ControlId::Fader("A".into()), 1),
            (ControlId::DelayKnob("B".into()), 2),
            (ControlId::Varispeed, 3),
        ] {
            let start = GestureEvent::new(PointerId::Touch(touch), 0.0, Phase::Start);
            engine.handle_gesture_with_lease(&control, start, counting_lease(&released));
        }
        assert_eq!(released.get(), 0);

        engine.cancel_gestures();
        assert_eq!(released.get(), 3);
        assert!(!engine.is_dragging(&ControlId::Varispeed));
        drop(engine);
        assert_eq!(released.get(), 3);
    }
}
