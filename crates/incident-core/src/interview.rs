//! **InterviewSession**: the question cursor, the confirmation gate, and the committed answers.
//!
//! Per-question state machine:
//!
//! ```text
//! AwaitingInput ──toggle_mic──→ Listening ──toggle_mic──→ Processing ──(transcript)──→ Confirming
//!      │  ↑                                                                  │    │
//!      │  └──────────────────────────── retry ───────────────────────────────┘    │
//!      └──────────────── submit_typed ─────────────────────→ Confirming          confirm
//!                                                                                 ↓
//!                                                     next AwaitingInput  or  Complete
//! ```
//!
//! Whether the channel is speaking is an overlay read from the `VoiceChannel`, not a separate
//! session state, so "listening while speaking" cannot be represented. Every transition that
//! leaves a question cancels the channel, which bumps its generation and drops any completion
//! still in flight for the old question.

use crate::catalog::{Question, QuestionCatalog};
use crate::error::{InterviewError, InterviewResult};
use crate::handoff::{Answers, CompletedInterview, HandoffEvent};
use chrono::{DateTime, Utc};
use incident_voice::{ChannelEvent, ChannelMode, ChannelState, Settled, VoiceChannel, VoiceEngines};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    LanguageSelect,
    Interview,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerSource {
    Captured,
    Typed,
}

/// Answer staged for the current question, waiting for confirm or retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAnswer {
    pub source: AnswerSource,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewState {
    AwaitingInput,
    Listening,
    /// Microphone closed; waiting for the final transcript.
    Processing,
    Confirming(PendingAnswer),
    Complete,
}

/// Result of applying one channel completion to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    SpeechFinished,
    TranscriptHeard(String),
    AnswerStaged(PendingAnswer),
    /// Capture finished with a blank transcript; back to awaiting input.
    NothingHeard,
    ChannelFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicToggle {
    Listening,
    Processing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Advanced { cursor: usize },
    Completed(CompletedInterview),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question {} of {}", self.current, self.total)
    }
}

#[derive(Debug)]
pub struct InterviewSession {
    id: Uuid,
    catalog: Arc<QuestionCatalog>,
    language: String,
    user_name: Option<String>,
    started_at: DateTime<Utc>,

    cursor: usize,
    answers: Answers,
    state: InterviewState,

    channel: VoiceChannel,
    question_lead_in: Duration,

    handoff_tx: mpsc::UnboundedSender<HandoffEvent>,
    handoff_rx: Option<mpsc::UnboundedReceiver<HandoffEvent>>,
}

impl InterviewSession {
    /// Open a session at question 0 and speak `intro` followed by the first question.
    /// Must be called inside a tokio runtime.
    pub(crate) fn begin(
        catalog: Arc<QuestionCatalog>,
        engines: VoiceEngines,
        language: String,
        user_name: Option<String>,
        intro: &str,
        intro_lead_in: Duration,
        question_lead_in: Duration,
    ) -> InterviewResult<Self> {
        let (handoff_tx, handoff_rx) = mpsc::unbounded_channel();
        let mut channel = VoiceChannel::new(engines, language.clone());
        let first = catalog
            .get(0)
            .ok_or_else(|| InterviewError::invalid_state("question catalog is empty"))?;
        channel.speak(format!("{intro}{}", first.text), 0, intro_lead_in)?;

        let session = Self {
            id: Uuid::new_v4(),
            catalog,
            language,
            user_name,
            started_at: Utc::now(),
            cursor: 0,
            answers: Answers::new(),
            state: InterviewState::AwaitingInput,
            channel,
            question_lead_in,
            handoff_tx,
            handoff_rx: Some(handoff_rx),
        };
        info!(
            session_id = %session.id,
            language = %session.language,
            questions = session.catalog.len(),
            "Interview started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            InterviewState::Complete => Phase::Complete,
            _ => Phase::Interview,
        }
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> &Question {
        // cursor is kept within the catalog, which is never empty
        &self.catalog.as_slice()[self.cursor]
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.cursor + 1,
            total: self.catalog.len(),
        }
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn pending(&self) -> Option<&PendingAnswer> {
        match &self.state {
            InterviewState::Confirming(p) => Some(p),
            _ => None,
        }
    }

    /// Transcript heard so far by an open microphone.
    pub fn live_transcript(&self) -> &str {
        self.channel.heard()
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn is_speaking(&self) -> bool {
        self.channel.mode() == ChannelMode::Speaking
    }

    /// One-line prompt for the reporter.
    pub fn status(&self) -> &'static str {
        if self.is_speaking() {
            return "Speaking...";
        }
        match self.state {
            InterviewState::AwaitingInput => "Click the microphone to answer.",
            InterviewState::Listening => "Listening... Click the mic when you are done.",
            InterviewState::Processing => "Processing your response...",
            InterviewState::Confirming(_) => "Please confirm if this is correct:",
            InterviewState::Complete => "Report complete.",
        }
    }

    /// Take the hand-off receiver. Can only be taken once.
    pub fn take_handoff_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<HandoffEvent>> {
        self.handoff_rx.take()
    }

    /// Stage a typed answer. Interrupts the channel if it is speaking or listening.
    pub fn submit_typed(&mut self, text: &str) -> InterviewResult<PendingAnswer> {
        self.ensure_active()?;
        if matches!(self.state, InterviewState::Confirming(_)) {
            return Err(InterviewError::invalid_state(
                "an answer is already waiting for confirmation",
            ));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(InterviewError::EmptyInput);
        }

        if self.channel.mode() != ChannelMode::Idle {
            debug!(mode = %self.channel.mode(), "typed answer interrupts channel");
            self.channel.cancel();
        }
        let pending = PendingAnswer {
            source: AnswerSource::Typed,
            text: text.to_string(),
        };
        self.state = InterviewState::Confirming(pending.clone());
        Ok(pending)
    }

    /// Open the microphone, or close it if already listening.
    pub fn toggle_mic(&mut self) -> InterviewResult<MicToggle> {
        self.ensure_active()?;
        self.pump();
        if matches!(self.state, InterviewState::Confirming(_)) {
            return Err(InterviewError::invalid_state(
                "confirm or retry the staged answer first",
            ));
        }

        match self.channel.mode() {
            ChannelMode::Idle => {
                self.channel.start_capture(self.cursor)?;
                self.state = InterviewState::Listening;
                Ok(MicToggle::Listening)
            }
            ChannelMode::Listening => {
                self.channel.stop_capture(self.cursor)?;
                self.state = InterviewState::Processing;
                Ok(MicToggle::Processing)
            }
            ChannelMode::Speaking | ChannelMode::Processing => Err(InterviewError::ChannelBusy),
        }
    }

    /// Commit the staged answer and move on.
    pub fn confirm(&mut self) -> InterviewResult<ConfirmOutcome> {
        self.ensure_active()?;
        let pending = match &self.state {
            InterviewState::Confirming(p) if !p.text.trim().is_empty() => p.clone(),
            _ => return Err(InterviewError::NoPendingAnswer),
        };

        let is_last = self.cursor == self.catalog.last_index();
        // The cursor only advances on commit and answers are never removed, so every earlier
        // question already has an entry and completion yields one answer per catalog id.
        debug_assert!(
            !is_last
                || self
                    .catalog
                    .ids()
                    .take(self.cursor)
                    .all(|id| self.answers.contains_key(id)),
            "reached the last question with earlier questions unanswered"
        );

        let question_id = self.current_question().id.clone();
        info!(
            session_id = %self.id,
            question = %question_id,
            source = ?pending.source,
            "Answer committed"
        );
        self.answers.insert(question_id, pending.text);
        self.channel.cancel();

        if is_last {
            self.state = InterviewState::Complete;
            let completed = CompletedInterview {
                session_id: self.id,
                language: self.language.clone(),
                reported_by: self.user_name.clone(),
                started_at: self.started_at,
                completed_at: Utc::now(),
                answers: self.answers.clone(),
            };
            info!(session_id = %self.id, answers = completed.answers.len(), "✅ Interview complete");
            self.emit(HandoffEvent::Completed(completed.clone()));
            return Ok(ConfirmOutcome::Completed(completed));
        }

        self.cursor += 1;
        self.state = InterviewState::AwaitingInput;
        self.speak_current(self.question_lead_in);
        Ok(ConfirmOutcome::Advanced {
            cursor: self.cursor,
        })
    }

    /// Throw away the staged answer (or open capture) and ask the same question again.
    pub fn retry(&mut self) -> InterviewResult<()> {
        self.ensure_active()?;
        if self.state == InterviewState::AwaitingInput {
            return Ok(());
        }
        self.channel.cancel();
        self.state = InterviewState::AwaitingInput;
        debug!(session_id = %self.id, question = self.cursor, "Answer discarded");
        Ok(())
    }

    /// Step back one question. Its committed answer is kept until re-confirmed.
    pub fn previous(&mut self) -> InterviewResult<usize> {
        self.ensure_active()?;
        if self.cursor == 0 {
            return Err(InterviewError::AtFirstQuestion);
        }
        self.channel.cancel();
        self.cursor -= 1;
        self.state = InterviewState::AwaitingInput;
        debug!(session_id = %self.id, question = self.cursor, "Moved back");
        Ok(self.cursor)
    }

    /// Speak the current question again.
    pub fn repeat_current(&mut self) -> InterviewResult<()> {
        self.ensure_active()?;
        if matches!(self.state, InterviewState::Confirming(_)) {
            return Err(InterviewError::invalid_state(
                "confirm or retry the staged answer first",
            ));
        }
        self.pump();
        if self.channel.mode() != ChannelMode::Idle {
            return Err(InterviewError::ChannelBusy);
        }
        let text = self.current_question().text.clone();
        self.channel.speak(text, self.cursor, Duration::ZERO)?;
        Ok(())
    }

    /// Leave the interview without finishing. Nothing is delivered except the notice.
    pub fn abandon(mut self) -> InterviewResult<()> {
        self.ensure_active()?;
        self.channel.cancel();
        info!(
            session_id = %self.id,
            answered = self.answers.len(),
            "Interview abandoned"
        );
        self.emit(HandoffEvent::Abandoned {
            session_id: self.id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Apply one raw channel completion. Returns `None` when it was stale and dropped.
    pub fn apply(&mut self, event: ChannelEvent) -> Option<SessionUpdate> {
        let settled = self.channel.accept(event)?;
        let update = match settled {
            Settled::SpeechDone => SessionUpdate::SpeechFinished,
            Settled::Heard(text) => SessionUpdate::TranscriptHeard(text),
            Settled::Captured(text) => {
                if self.state != InterviewState::Processing {
                    debug!(state = ?self.state, "transcript arrived outside processing");
                    return None;
                }
                if text.trim().is_empty() {
                    self.state = InterviewState::AwaitingInput;
                    SessionUpdate::NothingHeard
                } else {
                    let pending = PendingAnswer {
                        source: AnswerSource::Captured,
                        text,
                    };
                    self.state = InterviewState::Confirming(pending.clone());
                    SessionUpdate::AnswerStaged(pending)
                }
            }
            Settled::Failed(e) => {
                if matches!(
                    self.state,
                    InterviewState::Listening | InterviewState::Processing
                ) {
                    self.state = InterviewState::AwaitingInput;
                }
                SessionUpdate::ChannelFailed(e.to_string())
            }
        };
        Some(update)
    }

    /// Apply every completion already queued, without waiting.
    pub fn pump(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Some(event) = self.channel.try_recv() {
            if let Some(update) = self.apply(event) {
                updates.push(update);
            }
        }
        updates
    }

    /// Wait for the next completion that is not stale.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        loop {
            let event = self.channel.recv().await?;
            if let Some(update) = self.apply(event) {
                return Some(update);
            }
        }
    }

    /// Wait until speech has finished playing and any capture has finished processing.
    pub async fn settle(&mut self) -> Vec<SessionUpdate> {
        let mut updates = self.pump();
        while self.channel.is_settling() {
            match self.channel.recv().await {
                Some(event) => updates.extend(self.apply(event)),
                None => break,
            }
        }
        updates
    }

    fn ensure_active(&self) -> InterviewResult<()> {
        if self.state == InterviewState::Complete {
            return Err(InterviewError::invalid_state("interview is already complete"));
        }
        Ok(())
    }

    fn speak_current(&mut self, lead_in: Duration) {
        let text = self.current_question().text.clone();
        if let Err(e) = self.channel.speak(text, self.cursor, lead_in) {
            warn!(error = %e, question = self.cursor, "could not speak question");
        }
    }

    fn emit(&self, event: HandoffEvent) {
        if self.handoff_tx.send(event).is_err() {
            debug!(session_id = %self.id, "hand-off receiver dropped");
        }
    }
}
