use std::path::PathBuf;

use crate::audio::{AssetProvider, DecodedAudio};
use crate::config::StemSpec;
use crate::error::{MixerError, Result};

use super::decode::decode_audio;

/// Loads stems from `<root>/<file>`.
#[derive(Debug, Clone)]
pub struct FsAssetProvider {
    root: PathBuf,
}

impl FsAssetProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsAssetProvider { root: root.into() }
    }
}

impl AssetProvider for FsAssetProvider {
    async fn load_stem(&self, stem: &StemSpec) -> Result<DecodedAudio> {
        let path = self.root.join(&stem.file);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| MixerError::asset_load(&stem.label, format!("{}: {e}", path.display())))?;
        decode_audio(&stem.label, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_wav(path: &std::path::Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for _ in 0..800 {
                writer.write_sample(1000i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        std::fs::write(path, cursor.into_inner()).unwrap();
    }

    #[tokio::test]
    async fn loads_from_root() {
        let dir = tempfile::tempdir().unwrap();
        write_wav(&dir.path().join("DRUMS.wav"));
        let provider = FsAssetProvider::new(dir.path());
        let audio = provider
            .load_stem(&StemSpec::new("DRUMS", "DRUMS.wav"))
            .await
            .unwrap();
        assert_eq!(audio.len(), 800);
        assert_eq!(audio.sample_rate, 8000);
    }

    #[tokio::test]
    async fn missing_file_is_an_asset_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FsAssetProvider::new(dir.path());
        let err = provider
            .load_stem(&StemSpec::new("BASS", "BASS.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, MixerError::AssetLoad { label, .. } if label == "BASS"));
    }
}
