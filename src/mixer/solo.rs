//! Mute/solo resolution.
//!
//! With any stem soloed, only soloed stems sound. Otherwise every unmuted
//! stem sounds. A stem's effective gain is its volume when it sounds, else 0.

use super::stem::{Stem, StemParams};

pub fn any_soloed(stems: &[Stem]) -> bool {
    stems.iter().any(|s| s.params.soloed)
}

/// Effective gain of one stem given whether any stem is soloed.
pub fn gain_for(params: &StemParams, any_soloed: bool) -> f64 {
    let audible = if any_soloed { params.soloed } else { !params.muted };
    if audible { params.volume } else { 0.0 }
}

/// Effective gain of `stem` within `all`.
pub fn effective_gain(stem: &Stem, all: &[Stem]) -> f64 {
    gain_for(&stem.params, any_soloed(all))
}

/// Effective gains for every stem, in registry order.
pub fn resolve(stems: &[Stem]) -> Vec<f64> {
    let soloed = any_soloed(stems);
    stems.iter().map(|s| gain_for(&s.params, soloed)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StemSpec;

    fn stem(label: &str, volume: f64, muted: bool, soloed: bool) -> Stem {
        let mut s = Stem::new(StemSpec::new(label, ""));
        s.params = StemParams {
            volume,
            muted,
            soloed,
            delay_feedback: 0.0,
        };
        s
    }

    #[test]
    fn no_solo_respects_mute() {
        let stems = vec![stem("A", 0.7, false, false), stem("B", 0.9, true, false)];
        assert_eq!(resolve(&stems), vec![0.7, 0.0]);
    }

    #[test]
    fn solo_silences_everything_else() {
        let stems = vec![
            stem("A", 0.7, false, true),
            stem("B", 0.9, false, false),
            stem("C", 0.4, false, true),
        ];
        assert_eq!(resolve(&stems), vec![0.7, 0.0, 0.4]);
        assert_eq!(effective_gain(&stems[1], &stems), 0.0);
    }

    #[test]
    fn soloed_stem_keeps_its_volume() {
        let stems = vec![stem("A", 0.0, false, true), stem("B", 1.0, false, false)];
        assert_eq!(resolve(&stems), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_mix() {
        assert!(resolve(&[]).is_empty());
        assert!(!any_soloed(&[]));
    }
}
