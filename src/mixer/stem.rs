//! Stems and the ordered, label-keyed registry that owns them.

use crate::audio::DecodedAudio;
use crate::config::StemSpec;
use crate::input::mapper::clamp_unit;

/// User-controlled parameters of one stem.
///
/// Updates replace the whole value, so every reader within one event sees
/// either the old or the new parameters, never a mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StemParams {
    pub volume: f64,
    pub muted: bool,
    pub soloed: bool,
    pub delay_feedback: f64,
}

impl Default for StemParams {
    fn default() -> Self {
        StemParams {
            volume: 1.0,
            muted: false,
            soloed: false,
            delay_feedback: 0.0,
        }
    }
}

impl StemParams {
    pub fn with_volume(self, volume: f64) -> Self {
        StemParams {
            volume: clamp_unit(volume),
            ..self
        }
    }

    pub fn with_delay_feedback(self, amount: f64) -> Self {
        StemParams {
            delay_feedback: clamp_unit(amount),
            ..self
        }
    }

    /// Flip mute. Always clears solo.
    pub fn toggled_mute(self) -> Self {
        StemParams {
            muted: !self.muted,
            soloed: false,
            ..self
        }
    }

    /// Flip solo. Always clears mute.
    pub fn toggled_solo(self) -> Self {
        StemParams {
            soloed: !self.soloed,
            muted: false,
            ..self
        }
    }
}

/// Where a stem's audio stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState {
    Pending,
    Loaded(DecodedAudio),
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stem {
    pub spec: StemSpec,
    pub params: StemParams,
    pub source: SourceState,
}

impl Stem {
    pub fn new(spec: StemSpec) -> Self {
        Stem {
            spec,
            params: StemParams::default(),
            source: SourceState::Pending,
        }
    }

    pub fn label(&self) -> &str {
        &self.spec.label
    }

    pub fn loaded_source(&self) -> Option<&DecodedAudio> {
        match &self.source {
            SourceState::Loaded(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.source, SourceState::Loaded(_))
    }
}

/// Stems in configuration order with lookup by label.
#[derive(Debug, Clone, Default)]
pub struct StemRegistry {
    stems: Vec<Stem>,
}

impl StemRegistry {
    pub fn new(specs: &[StemSpec]) -> Self {
        StemRegistry {
            stems: specs.iter().cloned().map(Stem::new).collect(),
        }
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.stems.iter().position(|s| s.label() == label)
    }

    pub fn get(&self, label: &str) -> Option<&Stem> {
        self.stems.iter().find(|s| s.label() == label)
    }

    pub fn as_slice(&self) -> &[Stem] {
        &self.stems
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stem> {
        self.stems.iter()
    }

    pub fn len(&self) -> usize {
        self.stems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stems.is_empty()
    }

    /// Replace a stem's parameters with `f(old)`. Returns the index of the
    /// updated stem, or `None` for an unknown label.
    pub fn update(&mut self, label: &str, f: impl FnOnce(StemParams) -> StemParams) -> Option<usize> {
        let index = self.index_of(label)?;
        let stem = &mut self.stems[index];
        stem.params = f(stem.params);
        Some(index)
    }

    /// Replace every stem's parameters with `f(old)`.
    pub fn update_all(&mut self, f: impl Fn(StemParams) -> StemParams) {
        for stem in &mut self.stems {
            stem.params = f(stem.params);
        }
    }

    pub fn set_source(&mut self, label: &str, source: SourceState) -> bool {
        match self.index_of(label) {
            Some(index) => {
                self.stems[index].source = source;
                true
            }
            None => false,
        }
    }
}
