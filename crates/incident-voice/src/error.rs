//! Error types for the incident voice channel

use crate::channel::ChannelMode;
use thiserror::Error;

/// Result type alias for voice operations
pub type VoiceResult<T> = Result<T, VoiceError>;

/// Errors that can occur on the half-duplex voice channel or inside an engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    #[error("Channel busy: {0} in progress")]
    ChannelBusy(ChannelMode),

    #[error("Channel is not listening (mode: {0})")]
    NotListening(ChannelMode),

    #[error("TTS error: {0}")]
    Tts(String),

    #[error("STT error: {0}")]
    Stt(String),

    #[error("Vision error: {0}")]
    Vision(String),
}
