//! DSP: a pure-Rust audio context for the mixer graph.
//!
//! The same code renders inside a browser AudioWorklet (via WASM) and in
//! native hosts and tests.

pub mod context;
pub mod delay;
pub mod mixer;
pub mod param;
pub mod playback;

pub use context::SoftwareContext;

/// Frames rendered per graph evaluation. Also the minimum delay time, so
/// feedback cycles through a delay node are always well-defined.
pub const BLOCK_SIZE: usize = 128;
