//! Error taxonomy for the interview. Every variant is a rejected operation: nothing was mutated
//! and the caller may simply re-prompt.

use incident_voice::VoiceError;
use thiserror::Error;

pub type InterviewResult<T> = Result<T, InterviewError>;

#[derive(Error, Debug)]
pub enum InterviewError {
    /// Missing language, or an operation called in the wrong phase.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Capture or playback requested while the channel is occupied.
    #[error("Channel busy")]
    ChannelBusy,

    #[error("Answer is empty")]
    EmptyInput,

    #[error("No answer is waiting for confirmation")]
    NoPendingAnswer,

    #[error("Already at the first question")]
    AtFirstQuestion,

    #[error("Voice engine error: {0}")]
    Voice(VoiceError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl InterviewError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        InterviewError::InvalidState(msg.into())
    }
}

impl From<VoiceError> for InterviewError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::ChannelBusy(_) => InterviewError::ChannelBusy,
            VoiceError::NotListening(mode) => {
                InterviewError::InvalidState(format!("microphone is not open (channel {mode})"))
            }
            other => InterviewError::Voice(other),
        }
    }
}
