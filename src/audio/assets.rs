use std::future::Future;

use crate::audio::source::DecodedAudio;
use crate::config::StemSpec;
use crate::error::Result;

/// Fetches and decodes stem audio.
///
/// Failures must be reported as [`crate::MixerError::AssetLoad`]; the mixer
/// marks that stem unavailable and keeps loading the rest.
pub trait AssetProvider {
    fn load_stem(&self, stem: &StemSpec) -> impl Future<Output = Result<DecodedAudio>>;
}
