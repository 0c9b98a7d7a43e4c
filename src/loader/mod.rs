//! Stem asset loading for native hosts: decoding plus filesystem and HTTP
//! providers. In the browser the host decodes with WebAudio and hands the
//! samples to [`crate::MixerEngine::attach_source`] instead.

pub mod decode;
pub mod fs;
pub mod http;

pub use decode::decode_audio;
pub use fs::FsAssetProvider;
pub use http::HttpAssetProvider;
