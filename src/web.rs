//! JavaScript-facing wrapper around a [`MixerEngine`] rendering through the
//! pure-Rust [`SoftwareContext`].

use futures::executor::block_on;
use wasm_bindgen::prelude::*;

use crate::audio::DecodedAudio;
use crate::config::MixerConfig;
use crate::dsp::SoftwareContext;
use crate::error::MixerError;
use crate::input::{ControlId, PointerInput, PointerKind, PointerPhase, TouchInput, TouchPhase, TouchPoint};
use crate::mixer::MixerEngine;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

fn pointer_kind(pointer_type: &str) -> PointerKind {
    match pointer_type {
        "pen" => PointerKind::Pen,
        "touch" => PointerKind::Touch,
        _ => PointerKind::Mouse,
    }
}

fn touch_points(identifiers: &[i32], client_ys: &[f64]) -> Vec<TouchPoint> {
    identifiers
        .iter()
        .zip(client_ys)
        .map(|(&identifier, &client_y)| TouchPoint { identifier, client_y })
        .collect()
}

#[wasm_bindgen]
pub struct WasmMixer {
    inner: MixerEngine<SoftwareContext>,
}

#[wasm_bindgen]
impl WasmMixer {
    /// Create a mixer rendering at `sample_rate`. `config_json` overrides the
    /// default five-stem configuration. Throws on a non-positive sample rate
    /// or an invalid configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64, config_json: Option<String>) -> Result<WasmMixer, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => MixerConfig::from_json(&json).map_err(to_js)?,
            None => MixerConfig::default(),
        };
        let ctx = SoftwareContext::with_master_gain(sample_rate, config.master_gain).map_err(to_js)?;
        let inner = MixerEngine::new(config, ctx).map_err(to_js)?;
        Ok(WasmMixer { inner })
    }

    // ===== Sources =====

    #[wasm_bindgen(js_name = attachStem)]
    pub fn attach_stem(&mut self, label: &str, samples: Vec<f32>, sample_rate: u32) -> bool {
        self.inner
            .attach_source(label, DecodedAudio::new(samples, sample_rate))
    }

    #[wasm_bindgen(js_name = markUnavailable)]
    pub fn mark_unavailable(&mut self, label: &str, reason: &str) {
        self.inner.mark_unavailable(label, reason);
    }

    // ===== Controls =====

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, label: &str, volume: f64) {
        self.inner.set_volume(label, volume);
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self, label: &str) {
        self.inner.toggle_mute(label);
    }

    #[wasm_bindgen(js_name = toggleSolo)]
    pub fn toggle_solo(&mut self, label: &str) {
        self.inner.toggle_solo(label);
    }

    #[wasm_bindgen(js_name = unsoloAll)]
    pub fn unsolo_all(&mut self) {
        self.inner.unsolo_all();
    }

    #[wasm_bindgen(js_name = setDelay)]
    pub fn set_delay(&mut self, label: &str, amount: f64) {
        self.inner.set_delay(label, amount);
    }

    /// Returns the clamped rate actually applied.
    #[wasm_bindgen(js_name = setVarispeed)]
    pub fn set_varispeed(&mut self, rate: f64) -> f64 {
        self.inner.set_varispeed(rate)
    }

    // ===== Transport =====

    /// Start every loaded stem from the top. Resolves to the number of
    /// stems started; rejects when the context cannot be resumed.
    pub fn play(&mut self) -> Result<u32, JsValue> {
        let report = block_on(self.inner.play()).map_err(to_js)?;
        Ok(report.started.len() as u32)
    }

    /// Returns the number of playback nodes torn down.
    pub fn stop(&mut self) -> u32 {
        self.inner.stop() as u32
    }

    /// Simulate a browser autoplay policy refusing to resume the context.
    #[wasm_bindgen(js_name = setAutoplayBlocked)]
    pub fn set_autoplay_blocked(&mut self, blocked: bool) {
        self.inner.context_mut().set_autoplay_blocked(blocked);
    }

    // ===== Gestures =====

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, control: &str, pointer_type: &str, pointer_id: i32, client_y: f64) -> Result<(), JsValue> {
        self.pointer(control, pointer_type, pointer_id, client_y, PointerPhase::Down)
            .map(|_| ())
    }

    /// Returns the value applied, or `undefined` when no drag is active.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, control: &str, pointer_type: &str, pointer_id: i32, client_y: f64) -> Result<Option<f64>, JsValue> {
        self.pointer(control, pointer_type, pointer_id, client_y, PointerPhase::Move)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, control: &str, pointer_type: &str, pointer_id: i32, client_y: f64) -> Result<(), JsValue> {
        self.pointer(control, pointer_type, pointer_id, client_y, PointerPhase::Up)
            .map(|_| ())
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, control: &str, pointer_type: &str, pointer_id: i32, client_y: f64) -> Result<(), JsValue> {
        self.pointer(control, pointer_type, pointer_id, client_y, PointerPhase::Leave)
            .map(|_| ())
    }

    #[wasm_bindgen(js_name = touchStart)]
    pub fn touch_start(&mut self, control: &str, identifiers: Vec<i32>, client_ys: Vec<f64>) -> Result<(), JsValue> {
        self.touch(control, TouchPhase::Start, &identifiers, &client_ys)
            .map(|_| ())
    }

    /// Returns the last value applied by the changed touches, if any.
    #[wasm_bindgen(js_name = touchMove)]
    pub fn touch_move(&mut self, control: &str, identifiers: Vec<i32>, client_ys: Vec<f64>) -> Result<Option<f64>, JsValue> {
        self.touch(control, TouchPhase::Move, &identifiers, &client_ys)
    }

    #[wasm_bindgen(js_name = touchEnd)]
    pub fn touch_end(&mut self, control: &str, identifiers: Vec<i32>, client_ys: Vec<f64>) -> Result<(), JsValue> {
        self.touch(control, TouchPhase::End, &identifiers, &client_ys)
            .map(|_| ())
    }

    /// End every drag (the control surface is being torn down).
    #[wasm_bindgen(js_name = cancelGestures)]
    pub fn cancel_gestures(&mut self) {
        self.inner.cancel_gestures();
    }

    // ===== Output =====

    /// Render the next `frames` samples of the mixed output.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        self.inner.context_mut().render(&mut out);
        out
    }

    /// Current mixer state as a plain JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(to_js)
    }
}

impl WasmMixer {
    fn pointer(
        &mut self,
        control: &str,
        pointer_type: &str,
        pointer_id: i32,
        client_y: f64,
        phase: PointerPhase,
    ) -> Result<Option<f64>, JsValue> {
        let control = parse_control(control).map_err(to_js)?;
        let input = PointerInput {
            kind: pointer_kind(pointer_type),
            pointer_id,
            client_y,
            phase,
        };
        Ok(self.inner.handle_gesture(&control, input.normalize()))
    }

    fn touch(
        &mut self,
        control: &str,
        phase: TouchPhase,
        identifiers: &[i32],
        client_ys: &[f64],
    ) -> Result<Option<f64>, JsValue> {
        let control = parse_control(control).map_err(to_js)?;
        let input = TouchInput::new(phase, touch_points(identifiers, client_ys));
        let mut applied = None;
        for event in input.normalize() {
            if let Some(value) = self.inner.handle_gesture(&control, event) {
                applied = Some(value);
            }
        }
        Ok(applied)
    }
}

fn parse_control(control: &str) -> Result<ControlId, MixerError> {
    ControlId::parse(control).ok_or_else(|| MixerError::Config(format!("unknown control '{control}'")))
}
