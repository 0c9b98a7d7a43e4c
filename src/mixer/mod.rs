//! Stem mixing: parameter state, mute/solo resolution, routing and transport.

pub mod engine;
pub mod graph;
pub mod snapshot;
pub mod solo;
pub mod stem;
pub mod transport;
pub mod varispeed;

pub use engine::{LoadReport, MixerEngine};
pub use graph::StemGraph;
pub use snapshot::{MixerSnapshot, StemSnapshot};
pub use stem::{SourceState, Stem, StemParams, StemRegistry};
pub use transport::{PlayReport, TransportController, TransportState};
pub use varispeed::{VARISPEED_RANGE, VarispeedController};
