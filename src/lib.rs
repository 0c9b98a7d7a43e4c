pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod input;
#[cfg(feature = "loader")]
pub mod loader;
pub mod mixer;
pub mod web;

use wasm_bindgen::prelude::*;

pub use audio::{AssetProvider, AudioContext, ContextState, DecodedAudio, NodeId, ParamKind};
pub use config::{MixerConfig, StemSpec};
pub use dsp::SoftwareContext;
pub use error::{MixerError, Result};
pub use input::{ControlId, GestureEvent, Phase, PointerId};
pub use mixer::{LoadReport, MixerEngine, MixerSnapshot, PlayReport, TransportState};
pub use web::WasmMixer;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the mixer core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}
