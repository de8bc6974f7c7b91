//! Error types for drill-core.

use thiserror::Error;

/// Result type alias using AudioError.
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio playback error taxonomy.
///
/// `SourceUnavailable` is recoverable and never surfaced on its own: the
/// engine advances to the next candidate. `Unavailable` is terminal and
/// reaches the user as a status notice, never as a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("audio source unavailable")]
    SourceUnavailable,

    #[error("speech synthesis not supported by host")]
    SynthesisUnsupported,

    #[error("all playback strategies exhausted")]
    Unavailable,
}
