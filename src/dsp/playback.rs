//! Stem playback: reads a decoded buffer at a variable rate with linear
//! interpolation. One-shot; a stopped or finished voice outputs silence.

use std::sync::Arc;

use crate::audio::DecodedAudio;

#[derive(Debug, Clone)]
pub struct PlaybackVoice {
    data: Arc<[f32]>,
    /// Fractional read position in source samples.
    position: f64,
    /// Source sample rate / context sample rate.
    sample_rate_ratio: f64,
    stopped: bool,
}

impl PlaybackVoice {
    pub fn new(source: &DecodedAudio, context_sample_rate: f64) -> Self {
        PlaybackVoice {
            data: Arc::clone(&source.samples),
            position: 0.0,
            sample_rate_ratio: source.sample_rate as f64 / context_sample_rate,
            stopped: false,
        }
    }

    /// Produce the next output sample at playback `rate` (1.0 = native speed).
    pub fn next_sample(&mut self, rate: f64) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let sample = read_interpolated(&self.data, self.position);
        self.position += rate.max(0.0) * self.sample_rate_ratio;
        sample
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_finished(&self) -> bool {
        self.stopped || self.position >= self.data.len() as f64
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}

/// Linear interpolation between neighbouring samples at a fractional position.
fn read_interpolated(data: &[f32], position: f64) -> f32 {
    if data.is_empty() || position < 0.0 {
        return 0.0;
    }
    let idx = position as usize;
    if idx + 1 >= data.len() {
        return data.get(idx).copied().unwrap_or(0.0);
    }
    let frac = (position - idx as f64) as f32;
    data[idx] * (1.0 - frac) + data[idx + 1] * frac
}
