//! Collaborator interfaces: the audio context and the asset provider.

pub mod assets;
pub mod context;
pub mod source;

pub use assets::AssetProvider;
pub use context::{AudioContext, ContextState, NodeId, ParamKind};
pub use source::DecodedAudio;
