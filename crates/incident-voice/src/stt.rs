//! **Speech-to-Text (STT)**: the capture half of the channel.
//!
//! A capture has two engine phases: `listen` delivers the live transcript once the engine has
//! heard something, and `finalize` turns whatever was heard when the user stopped into the final
//! transcript. `SimulatedStt` produces a canned transcript after fixed delays.

use crate::error::VoiceResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Transcript produced by the simulation when nothing else is configured.
pub const DEFAULT_SIMULATED_TRANSCRIPT: &str =
    "This is a simulated transcription of your voice input...";

/// Backend for turning captured speech into text. Implement for a local or remote recognizer.
#[async_trait]
pub trait SttBackend: Send + Sync {
    /// Resolves with the live transcript heard so far. Dropped (aborted) if the capture is
    /// stopped or cancelled first.
    async fn listen(&self, language: &str) -> VoiceResult<String>;

    /// Finish a capture. `heard` is the live transcript at the moment capture stopped (possibly
    /// empty). Resolves with the final transcript.
    async fn finalize(&self, heard: &str) -> VoiceResult<String>;
}

/// Timed STT simulation.
#[derive(Debug, Clone)]
pub struct SimulatedStt {
    /// Delay before the live transcript appears.
    pub transcript_delay: Duration,
    /// Delay between stopping capture and the final transcript.
    pub processing_delay: Duration,
    /// Text the simulation "hears".
    pub transcript: String,
}

impl SimulatedStt {
    pub fn new(transcript_delay: Duration, processing_delay: Duration) -> Self {
        Self {
            transcript_delay,
            processing_delay,
            transcript: DEFAULT_SIMULATED_TRANSCRIPT.to_string(),
        }
    }

    /// Return `transcript` instead of the default message.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }
}

impl Default for SimulatedStt {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(1000))
    }
}

#[async_trait]
impl SttBackend for SimulatedStt {
    async fn listen(&self, language: &str) -> VoiceResult<String> {
        debug!(language, "SimulatedStt: listening");
        tokio::time::sleep(self.transcript_delay).await;
        Ok(self.transcript.clone())
    }

    async fn finalize(&self, heard: &str) -> VoiceResult<String> {
        tokio::time::sleep(self.processing_delay).await;
        Ok(heard.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn listen_returns_configured_transcript() {
        let stt = SimulatedStt::default().with_transcript("Database is down");
        assert_eq!(stt.listen("english").await.unwrap(), "Database is down");
    }

    #[tokio::test(start_paused = true)]
    async fn finalize_keeps_what_was_heard() {
        let stt = SimulatedStt::default();
        assert_eq!(stt.finalize("  partial words ").await.unwrap(), "partial words");
        assert_eq!(stt.finalize("").await.unwrap(), "");
    }
}
