//! **VoiceChannel**: the half-duplex audio device the interview talks through.
//!
//! The channel is either idle, speaking, listening, or processing a finished capture; never two
//! of these at once. Every engine call runs as a tokio task that reports back over an internal
//! mpsc queue, tagged with the `Ticket` (generation + question index) that was current when it
//! was issued. The owner feeds each event back through `accept`, which drops anything whose
//! ticket no longer matches the live state. `cancel` aborts the running task and bumps the
//! generation, so a late completion from a superseded question can never land.

use crate::engines::VoiceEngines;
use crate::error::{VoiceError, VoiceResult};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the device is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    Idle,
    Listening,
    /// Capture stopped; the engine is producing the final transcript.
    Processing,
    Speaking,
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelMode::Idle => "idle",
            ChannelMode::Listening => "listening",
            ChannelMode::Processing => "processing",
            ChannelMode::Speaking => "speaking",
        };
        f.write_str(s)
    }
}

/// Identity of one issued engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Ticket {
    pub generation: u64,
    pub question_index: usize,
}

/// Snapshot of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelState {
    pub mode: ChannelMode,
    pub active_question: Option<usize>,
    pub generation: u64,
}

impl ChannelState {
    /// Ticket a completion must carry to be applied, if any operation has been issued.
    pub fn ticket(&self) -> Option<Ticket> {
        self.active_question.map(|question_index| Ticket {
            generation: self.generation,
            question_index,
        })
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation && self.active_question == Some(ticket.question_index)
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            mode: ChannelMode::Idle,
            active_question: None,
            generation: 0,
        }
    }
}

/// Raw completion sent by an engine task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEventKind {
    SpeechSettled,
    /// Live transcript while listening.
    Transcript(String),
    /// Final transcript after capture stopped.
    CaptureFinished(String),
    Failed(VoiceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub ticket: Ticket,
    pub kind: ChannelEventKind,
}

/// A completion that passed the staleness check and was applied to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    SpeechDone,
    Heard(String),
    Captured(String),
    Failed(VoiceError),
}

/// Half-duplex channel over injected engines.
pub struct VoiceChannel {
    state: ChannelState,
    engines: VoiceEngines,
    language: String,

    // Live transcript for the capture in progress
    heard: String,

    // Engine task for the current ticket
    inflight: Option<JoinHandle<()>>,

    event_tx: mpsc::UnboundedSender<ChannelEvent>,
    event_rx: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl VoiceChannel {
    /// Create an idle channel. `language` is passed to every engine call.
    pub fn new(engines: VoiceEngines, language: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            state: ChannelState::default(),
            engines,
            language: language.into(),
            heard: String::new(),
            inflight: None,
            event_tx,
            event_rx,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn mode(&self) -> ChannelMode {
        self.state.mode
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Live transcript of the capture in progress (empty when nothing has been heard yet).
    pub fn heard(&self) -> &str {
        &self.heard
    }

    /// True while an operation will settle on its own (speech playing or capture processing).
    pub fn is_settling(&self) -> bool {
        matches!(self.state.mode, ChannelMode::Speaking | ChannelMode::Processing)
    }

    /// Speak `text` for the question at `question_index`, after an optional lead-in pause.
    pub fn speak(
        &mut self,
        text: impl Into<String>,
        question_index: usize,
        lead_in: Duration,
    ) -> VoiceResult<Ticket> {
        self.ensure_idle()?;
        let ticket = self.issue(ChannelMode::Speaking, question_index);
        let text = text.into();
        let tts = Arc::clone(&self.engines.tts);
        let language = self.language.clone();
        let tx = self.event_tx.clone();

        debug!(generation = ticket.generation, question = question_index, "Channel: speaking");
        self.inflight = Some(tokio::spawn(async move {
            if !lead_in.is_zero() {
                tokio::time::sleep(lead_in).await;
            }
            let kind = match tts.speak(&text, &language).await {
                Ok(()) => ChannelEventKind::SpeechSettled,
                Err(e) => ChannelEventKind::Failed(e),
            };
            let _ = tx.send(ChannelEvent { ticket, kind });
        }));
        Ok(ticket)
    }

    /// Open the microphone for the question at `question_index`.
    pub fn start_capture(&mut self, question_index: usize) -> VoiceResult<Ticket> {
        self.ensure_idle()?;
        let ticket = self.issue(ChannelMode::Listening, question_index);
        let stt = Arc::clone(&self.engines.stt);
        let language = self.language.clone();
        let tx = self.event_tx.clone();

        info!(generation = ticket.generation, question = question_index, "🎤 Channel: listening");
        self.inflight = Some(tokio::spawn(async move {
            let kind = match stt.listen(&language).await {
                Ok(text) => ChannelEventKind::Transcript(text),
                Err(e) => ChannelEventKind::Failed(e),
            };
            let _ = tx.send(ChannelEvent { ticket, kind });
        }));
        Ok(ticket)
    }

    /// Close the microphone. The final transcript arrives later as `CaptureFinished`.
    pub fn stop_capture(&mut self, question_index: usize) -> VoiceResult<Ticket> {
        let ticket = match self.state.ticket() {
            Some(t)
                if self.state.mode == ChannelMode::Listening
                    && t.question_index == question_index =>
            {
                t
            }
            _ => return Err(VoiceError::NotListening(self.state.mode)),
        };

        // Whatever the recognizer has not delivered yet is lost
        self.abort_inflight();
        self.absorb_queued_transcript(ticket);
        self.state.mode = ChannelMode::Processing;

        let heard = self.heard.clone();
        let stt = Arc::clone(&self.engines.stt);
        let tx = self.event_tx.clone();

        debug!(generation = ticket.generation, heard_chars = heard.len(), "Channel: processing capture");
        self.inflight = Some(tokio::spawn(async move {
            let kind = match stt.finalize(&heard).await {
                Ok(text) => ChannelEventKind::CaptureFinished(text),
                Err(e) => ChannelEventKind::Failed(e),
            };
            let _ = tx.send(ChannelEvent { ticket, kind });
        }));
        Ok(ticket)
    }

    /// Abort whatever is in flight, invalidate outstanding completions, and go idle.
    /// Returns the new generation.
    pub fn cancel(&mut self) -> u64 {
        self.abort_inflight();
        self.state.generation += 1;
        self.state.mode = ChannelMode::Idle;
        self.heard.clear();
        debug!(generation = self.state.generation, "Channel: cancelled");
        self.state.generation
    }

    /// Apply a completion if it still belongs to the live ticket. Stale or out-of-phase events
    /// are dropped and yield `None`.
    pub fn accept(&mut self, event: ChannelEvent) -> Option<Settled> {
        if !self.state.matches(&event.ticket) {
            debug!(
                event_generation = event.ticket.generation,
                event_question = event.ticket.question_index,
                live_generation = self.state.generation,
                "Channel: discarding stale completion"
            );
            return None;
        }

        match (event.kind, self.state.mode) {
            (ChannelEventKind::SpeechSettled, ChannelMode::Speaking) => {
                self.inflight = None;
                self.state.mode = ChannelMode::Idle;
                Some(Settled::SpeechDone)
            }
            (ChannelEventKind::Transcript(text), ChannelMode::Listening) => {
                self.inflight = None;
                self.heard = text.clone();
                Some(Settled::Heard(text))
            }
            (ChannelEventKind::CaptureFinished(text), ChannelMode::Processing) => {
                self.inflight = None;
                self.state.mode = ChannelMode::Idle;
                self.heard.clear();
                Some(Settled::Captured(text))
            }
            (ChannelEventKind::Failed(e), mode) if mode != ChannelMode::Idle => {
                warn!(error = %e, %mode, "Channel: engine failed");
                self.abort_inflight();
                self.state.mode = ChannelMode::Idle;
                self.heard.clear();
                Some(Settled::Failed(e))
            }
            (kind, mode) => {
                debug!(?kind, %mode, "Channel: ignoring out-of-phase completion");
                None
            }
        }
    }

    /// Wait for the next raw completion.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.event_rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        self.event_rx.try_recv().ok()
    }

    fn ensure_idle(&self) -> VoiceResult<()> {
        match self.state.mode {
            ChannelMode::Idle => Ok(()),
            mode => Err(VoiceError::ChannelBusy(mode)),
        }
    }

    fn issue(&mut self, mode: ChannelMode, question_index: usize) -> Ticket {
        self.abort_inflight();
        self.state.generation += 1;
        self.state.mode = mode;
        self.state.active_question = Some(question_index);
        self.heard.clear();
        Ticket {
            generation: self.state.generation,
            question_index,
        }
    }

    /// Take a live transcript the listener already queued into `heard`, so it is not lost once
    /// the mode moves on. Every other queued event is put back for the owner.
    fn absorb_queued_transcript(&mut self, ticket: Ticket) {
        let queued: Vec<ChannelEvent> =
            std::iter::from_fn(|| self.event_rx.try_recv().ok()).collect();
        for event in queued {
            match event.kind {
                ChannelEventKind::Transcript(text) if event.ticket == ticket => {
                    debug!(generation = ticket.generation, "Channel: absorbed queued transcript");
                    self.heard = text;
                }
                kind => {
                    let _ = self.event_tx.send(ChannelEvent {
                        ticket: event.ticket,
                        kind,
                    });
                }
            }
        }
    }

    fn abort_inflight(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

impl Drop for VoiceChannel {
    fn drop(&mut self) {
        self.abort_inflight();
    }
}

impl fmt::Debug for VoiceChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceChannel")
            .field("state", &self.state)
            .field("language", &self.language)
            .field("heard", &self.heard)
            .finish_non_exhaustive()
    }
}
