//! # Incident Core - Guided Voice Interview
//!
//! Walks a reporter through the eight incident questions over a half-duplex voice channel.
//! Each answer, spoken or typed, is staged and must be confirmed before it is committed; the
//! finished answer mapping is handed off for report rendering.
//!
//! ```text
//! LanguageGate ──start──→ InterviewSession ──speak──→ VoiceChannel
//!                              │      ↑                    │
//!                              │      └── generation-checked completions
//!                              ↓
//!                         HandoffEvent::Completed / Abandoned
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod handoff;
pub mod interview;
pub mod language;

pub use catalog::{Category, Question, QuestionCatalog};
pub use config::InterviewConfig;
pub use error::{InterviewError, InterviewResult};
pub use handoff::{Answers, CompletedInterview, HandoffEvent};
pub use interview::{
    AnswerSource, ConfirmOutcome, InterviewSession, InterviewState, MicToggle, PendingAnswer,
    Phase, Progress, SessionUpdate,
};
pub use language::{intro_text, start_interview, LanguageGate, SUPPORTED_LANGUAGES};
