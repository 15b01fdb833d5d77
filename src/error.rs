//! Error kinds surfaced by the conversion and transmission engines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorseError {
    /// Empty event sequence, out of range speed or seek position.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A playback session is already active.
    #[error("playback already in progress")]
    AlreadyPlaying,

    /// A flash transmission is already active.
    #[error("transmission already in progress")]
    AlreadyTransmitting,

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device unsupported: {0}")]
    DeviceUnsupported(String),

    #[error("audio playback failed: {0}")]
    AudioPlaybackFailed(String),

    #[error("storage full: {0}")]
    StorageFull(String),

    #[error("audio generation failed: {0}")]
    GenerationFailed(String),

    #[error("transmission failed: {0}")]
    TransmissionFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
