//! Read model for the presentation layer.

use serde::Serialize;

use super::solo;
use super::stem::Stem;
use super::transport::TransportState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StemSnapshot {
    pub label: String,
    pub volume: f64,
    pub muted: bool,
    pub soloed: bool,
    pub delay_feedback: f64,
    pub effective_gain: f64,
    pub available: bool,
    /// A playback node of this stem is currently producing sound.
    pub sounding: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerSnapshot {
    pub stems: Vec<StemSnapshot>,
    pub varispeed: f64,
    pub transport: TransportState,
    pub any_soloed: bool,
    /// The transport is `Playing` but every stem has run out of audio.
    pub ended: bool,
}

impl MixerSnapshot {
    /// `sounding` lists the labels whose playback is still audible.
    pub fn capture(
        stems: &[Stem],
        varispeed: f64,
        transport: TransportState,
        sounding: &[String],
    ) -> Self {
        let gains = solo::resolve(stems);
        let stems = stems
            .iter()
            .zip(gains)
            .map(|(stem, effective_gain)| StemSnapshot {
                label: stem.label().to_string(),
                volume: stem.params.volume,
                muted: stem.params.muted,
                soloed: stem.params.soloed,
                delay_feedback: stem.params.delay_feedback,
                effective_gain,
                available: stem.is_available(),
                sounding: sounding.iter().any(|l| l == stem.label()),
            })
            .collect::<Vec<_>>();
        MixerSnapshot {
            any_soloed: stems.iter().any(|s| s.soloed),
            ended: transport == TransportState::Playing && sounding.is_empty(),
            stems,
            varispeed,
            transport,
        }
    }

    pub fn stem(&self, label: &str) -> Option<&StemSnapshot> {
        self.stems.iter().find(|s| s.label == label)
    }
}
