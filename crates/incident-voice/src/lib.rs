//! # Incident Voice - Half-Duplex Interview Channel
//!
//! The audio side of the guided incident interview. A single channel either speaks a prompt or
//! listens for an answer, never both. Engines are injected, so the timed simulation shipped here
//! and a real recognizer/synthesizer are interchangeable.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VoiceChannel                           │
//! │  ┌──────────────┐   ticket(gen, q)   ┌──────────────┐       │
//! │  │ speak/start/ │ ─────────────────→ │ engine task  │       │
//! │  │ stop/cancel  │                    │ (tokio)      │       │
//! │  └──────────────┘                    └──────────────┘       │
//! │         ↑                                    ↓              │
//! │  ┌──────────────┐    stale? drop     ┌──────────────┐       │
//! │  │   accept()   │ ←───────────────── │  mpsc queue  │       │
//! │  └──────────────┘                    └──────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod channel;
pub mod engines;
pub mod error;
pub mod stt;
pub mod tts;
pub mod vision;

pub use channel::{
    ChannelEvent, ChannelEventKind, ChannelMode, ChannelState, Settled, Ticket, VoiceChannel,
};
pub use engines::{SimulationConfig, VoiceEngines};
pub use error::{VoiceError, VoiceResult};
pub use stt::{SimulatedStt, SttBackend, DEFAULT_SIMULATED_TRANSCRIPT};
pub use tts::{SimulatedTts, TtsBackend};
pub use vision::{SimulatedVision, VisionBackend, DEFAULT_SIMULATED_ANALYSIS};
