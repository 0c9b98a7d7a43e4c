//! Mixer configuration: stem list, tempo, smoothing and gesture constants.
//!
//! Every field has a default, so a host can pass partial JSON
//! (e.g. `{"tempoBpm": 96}`) and keep the rest.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MixerError, Result};

/// One configured stem: its unique label and the asset file it loads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemSpec {
    pub label: String,
    pub file: String,
}

impl StemSpec {
    pub fn new(label: impl Into<String>, file: impl Into<String>) -> Self {
        StemSpec {
            label: label.into(),
            file: file.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MixerConfig {
    /// Stems in display order.
    pub stems: Vec<StemSpec>,
    /// Path or URL prefix the asset provider resolves stem files against.
    pub asset_base: String,
    /// Tempo the delay time is derived from.
    pub tempo_bpm: f64,
    /// Capacity of each stem's delay line.
    pub max_delay_seconds: f64,
    /// Time constant of the feedback-gain approach, in seconds.
    pub feedback_time_constant: f64,
    /// Drag distance in pixels that traverses a fader's full range.
    pub fader_resistance: f64,
    /// Knob value change per pixel of vertical drag.
    pub knob_sensitivity: f64,
    /// Gain applied on the master bus before soft clipping.
    pub master_gain: f64,
}

impl Default for MixerConfig {
    fn default() -> Self {
        let stems = ["DRUMS", "SYNTHS", "GUITARS", "BASS", "VOCALS"]
            .iter()
            .map(|label| StemSpec::new(*label, format!("{label}.mp3")))
            .collect();
        MixerConfig {
            stems,
            asset_base: "/stems/millionaire".to_string(),
            tempo_bpm: 120.0,
            max_delay_seconds: 5.0,
            feedback_time_constant: 2.5,
            fader_resistance: 100.0,
            knob_sensitivity: 0.005,
            master_gain: 1.0,
        }
    }
}

impl MixerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MixerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for stem in &self.stems {
            if stem.label.is_empty() {
                return Err(MixerError::Config("stem label must not be empty".into()));
            }
            if !seen.insert(stem.label.as_str()) {
                return Err(MixerError::Config(format!(
                    "duplicate stem label '{}'",
                    stem.label
                )));
            }
        }
        let positive = [
            ("tempoBpm", self.tempo_bpm),
            ("maxDelaySeconds", self.max_delay_seconds),
            ("feedbackTimeConstant", self.feedback_time_constant),
            ("faderResistance", self.fader_resistance),
            ("knobSensitivity", self.knob_sensitivity),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(MixerError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let delay_time = self.eighth_note_seconds();
        if delay_time > self.max_delay_seconds {
            return Err(MixerError::Config(format!(
                "eighth-note delay of {delay_time}s at {} BPM exceeds maxDelaySeconds {}",
                self.tempo_bpm, self.max_delay_seconds
            )));
        }
        if !(self.master_gain.is_finite() && self.master_gain >= 0.0) {
            return Err(MixerError::Config(format!(
                "masterGain must be non-negative, got {}",
                self.master_gain
            )));
        }
        Ok(())
    }

    /// One eighth note at the configured tempo, in seconds.
    pub fn eighth_note_seconds(&self) -> f64 {
        60.0 / self.tempo_bpm / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_five_stem_session() {
        let config = MixerConfig::default();
        let labels: Vec<_> = config.stems.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["DRUMS", "SYNTHS", "GUITARS", "BASS", "VOCALS"]);
        assert_eq!(config.stems[0].file, "DRUMS.mp3");
        assert!((config.eighth_note_seconds() - 0.25).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MixerConfig::from_json(r#"{"tempoBpm": 96}"#).unwrap();
        assert_eq!(config.tempo_bpm, 96.0);
        assert_eq!(config.stems.len(), 5);
        assert_eq!(config.feedback_time_constant, 2.5);
    }

    #[test]
    fn custom_stems() {
        let json = r#"{"stems": [{"label": "KEYS", "file": "keys.wav"}]}"#;
        let config = MixerConfig::from_json(json).unwrap();
        assert_eq!(config.stems, vec![StemSpec::new("KEYS", "keys.wav")]);
    }

    #[test]
    fn rejects_duplicate_labels() {
        let json = r#"{"stems": [{"label": "A", "file": "a"}, {"label": "A", "file": "b"}]}"#;
        let err = MixerConfig::from_json(json).unwrap_err();
        assert!(matches!(err, MixerError::Config(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_non_positive_constants() {
        assert!(MixerConfig::from_json(r#"{"tempoBpm": 0}"#).is_err());
        assert!(MixerConfig::from_json(r#"{"faderResistance": -5}"#).is_err());
        assert!(MixerConfig::from_json(r#"{"masterGain": -1}"#).is_err());
    }

    #[test]
    fn delay_must_fit_the_delay_line() {
        // 5 BPM: an eighth note lasts 6s, longer than the 5s default line
        let err = MixerConfig::from_json(r#"{"tempoBpm": 5}"#).unwrap_err();
        assert!(matches!(err, MixerError::Config(msg) if msg.contains("maxDelaySeconds")));
        assert!(MixerConfig::from_json(r#"{"tempoBpm": 5, "maxDelaySeconds": 6}"#).is_ok());
        assert!(MixerConfig::from_json(r#"{"tempoBpm": 6}"#).is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            MixerConfig::from_json("{"),
            Err(MixerError::Config(_))
        ));
    }
}
