//! Engine bundle injected into the voice channel, and the timing knobs of the simulation.

use crate::stt::{SimulatedStt, SttBackend, DEFAULT_SIMULATED_TRANSCRIPT};
use crate::tts::{SimulatedTts, TtsBackend};
use crate::vision::{SimulatedVision, VisionBackend, DEFAULT_SIMULATED_ANALYSIS};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

fn default_speak_settle_ms() -> u64 {
    2000
}

fn default_transcript_delay_ms() -> u64 {
    1000
}

fn default_processing_delay_ms() -> u64 {
    1000
}

fn default_analysis_delay_ms() -> u64 {
    2000
}

fn default_transcript() -> String {
    DEFAULT_SIMULATED_TRANSCRIPT.to_string()
}

fn default_image_analysis() -> String {
    DEFAULT_SIMULATED_ANALYSIS.to_string()
}

/// Timing and canned output for the simulated engines.
///
/// | Key | Default | Description |
/// |-----|---------|-------------|
/// | speak_settle_ms | 2000 | How long one utterance plays. |
/// | transcript_delay_ms | 1000 | Delay before the live transcript appears. |
/// | processing_delay_ms | 1000 | Delay between stopping capture and the final transcript. |
/// | analysis_delay_ms | 2000 | Image analysis latency. |
/// | transcript | canned sentence | What the simulated recognizer hears. |
/// | image_analysis | canned sentence | What the simulated vision engine reports. |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_speak_settle_ms")]
    pub speak_settle_ms: u64,
    #[serde(default = "default_transcript_delay_ms")]
    pub transcript_delay_ms: u64,
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,
    #[serde(default = "default_analysis_delay_ms")]
    pub analysis_delay_ms: u64,
    #[serde(default = "default_transcript")]
    pub transcript: String,
    #[serde(default = "default_image_analysis")]
    pub image_analysis: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speak_settle_ms: default_speak_settle_ms(),
            transcript_delay_ms: default_transcript_delay_ms(),
            processing_delay_ms: default_processing_delay_ms(),
            analysis_delay_ms: default_analysis_delay_ms(),
            transcript: default_transcript(),
            image_analysis: default_image_analysis(),
        }
    }
}

/// The injected capabilities. A real engine and the simulation are interchangeable here.
#[derive(Clone)]
pub struct VoiceEngines {
    pub tts: Arc<dyn TtsBackend>,
    pub stt: Arc<dyn SttBackend>,
    pub vision: Arc<dyn VisionBackend>,
}

impl VoiceEngines {
    pub fn new(
        tts: Arc<dyn TtsBackend>,
        stt: Arc<dyn SttBackend>,
        vision: Arc<dyn VisionBackend>,
    ) -> Self {
        Self { tts, stt, vision }
    }

    /// Build the timed simulation from config.
    pub fn simulated(config: &SimulationConfig) -> Self {
        let tts = SimulatedTts::new(Duration::from_millis(config.speak_settle_ms));
        let stt = SimulatedStt::new(
            Duration::from_millis(config.transcript_delay_ms),
            Duration::from_millis(config.processing_delay_ms),
        )
        .with_transcript(config.transcript.clone());
        let vision = SimulatedVision {
            analysis_delay: Duration::from_millis(config.analysis_delay_ms),
            analysis: config.image_analysis.clone(),
        };
        Self::new(Arc::new(tts), Arc::new(stt), Arc::new(vision))
    }
}

impl std::fmt::Debug for VoiceEngines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceEngines").finish_non_exhaustive()
    }
}
