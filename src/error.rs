use thiserror::Error;

/// Errors raised at the mixer's asynchronous and host-facing boundaries.
///
/// Parameter updates (volume, mute, solo, delay, varispeed, gestures) never
/// produce one of these; they operate on in-memory state that is already valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MixerError {
    /// A stem could not be fetched or decoded. The stem stays unavailable,
    /// the others load normally.
    #[error("stem '{label}' failed to load: {reason}")]
    AssetLoad { label: String, reason: String },

    /// The audio context is blocked (usually no user gesture yet).
    /// Recoverable by a later user-initiated play.
    #[error("audio context unavailable: {0}")]
    ContextUnavailable(String),

    /// The host refused to start a playback node for one stem.
    #[error("playback of stem '{label}' rejected: {reason}")]
    PlaybackRejected { label: String, reason: String },

    /// Invalid mixer configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MixerError {
    pub fn asset_load(label: impl Into<String>, reason: impl ToString) -> Self {
        MixerError::AssetLoad {
            label: label.into(),
            reason: reason.to_string(),
        }
    }

    pub fn playback_rejected(label: impl Into<String>, reason: impl ToString) -> Self {
        MixerError::PlaybackRejected {
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for MixerError {
    fn from(e: serde_json::Error) -> Self {
        MixerError::Config(e.to_string())
    }
}

/// Result type for mixer boundary operations.
pub type Result<T> = std::result::Result<T, MixerError>;
