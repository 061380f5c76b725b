//! **Text-to-Speech (TTS)**: the playback half of the channel.
//!
//! Implement `TtsBackend` for a real synthesis engine. `SimulatedTts` stands in for one: it
//! "plays" for a fixed settlement delay and then resolves, exactly as a real engine would
//! resolve when its audio queue drains.

use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Backend that speaks text aloud. The future resolves once playback has settled.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Speak `text` in the given language tag. Resolves when the utterance has finished.
    async fn speak(&self, text: &str, language: &str) -> VoiceResult<()>;
}

/// Timed TTS simulation: waits `settle` and reports success.
#[derive(Debug, Clone)]
pub struct SimulatedTts {
    /// How long a simulated utterance takes to play out.
    pub settle: Duration,
}

impl SimulatedTts {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }
}

impl Default for SimulatedTts {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(2000),
        }
    }
}

#[async_trait]
impl TtsBackend for SimulatedTts {
    async fn speak(&self, text: &str, language: &str) -> VoiceResult<()> {
        if text.trim().is_empty() {
            return Err(VoiceError::Tts("nothing to speak".to_string()));
        }
        debug!(language, chars = text.len(), "SimulatedTts: speaking");
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}
