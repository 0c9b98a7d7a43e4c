use crate::audio::{AssetProvider, DecodedAudio};
use crate::config::{MixerConfig, StemSpec};
use crate::error::{MixerError, Result};

use super::decode::decode_audio;

/// Fetches stems from `<base_url>/<file>`.
#[derive(Debug, Clone)]
pub struct HttpAssetProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpAssetProvider {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Resolve stems against the configured `assetBase`.
    pub fn from_config(config: &MixerConfig) -> Self {
        Self::new(config.asset_base.clone())
    }

    pub fn url_for(&self, stem: &StemSpec) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), stem.file)
    }
}

impl AssetProvider for HttpAssetProvider {
    async fn load_stem(&self, stem: &StemSpec) -> Result<DecodedAudio> {
        let url = self.url_for(stem);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MixerError::asset_load(&stem.label, e))?;
        if !response.status().is_success() {
            return Err(MixerError::asset_load(
                &stem.label,
                format!("{url} returned {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MixerError::asset_load(&stem.label, e))?;
        decode_audio(&stem.label, &bytes)
    }
}
