use std::sync::Arc;

/// Decoded stem audio: one mono channel of PCM at its native sample rate.
///
/// Cloning is cheap; every playback node created from the same stem shares
/// the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        DecodedAudio {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// Build from 16-bit signed PCM.
    pub fn from_i16(pcm: &[i16], sample_rate: u32) -> Self {
        let samples: Vec<f32> = pcm.iter().map(|&s| s as f32 / 32768.0).collect();
        Self::new(samples, sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration at native speed, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
